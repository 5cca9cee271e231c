use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use rust_csv_streaming::{Configuration, CsvReader, CsvSettings, Record};

fn synthetic_input(rows: usize) -> String {
    let mut out = String::from("id,name,comment,amount\n");
    for i in 0..rows {
        out.push_str(&format!(
            "{i},name {i},\"quoted, with \"\"escapes\"\"\nand a break\",{}.{:02}\n",
            i * 3,
            i % 100
        ));
    }
    out
}

fn read_all(input: &str, config: &std::sync::Arc<Configuration>) -> usize {
    let mut reader = CsvReader::new(input.as_bytes(), std::sync::Arc::clone(config));
    let mut record = Record::new();
    let mut fields = 0;
    while reader.read_record_into(&mut record).unwrap() {
        fields += record.len();
    }
    fields
}

fn bench_tokenizer(c: &mut Criterion) {
    let input = synthetic_input(10_000);
    let mut group = c.benchmark_group("tokenizer");
    group.throughput(Throughput::Bytes(input.len() as u64));

    let comma = std::sync::Arc::new(Configuration::default());
    group.bench_function("comma_reuse_record", |b| {
        b.iter(|| read_all(black_box(&input), &comma))
    });

    let multi = std::sync::Arc::new(
        Configuration::new(CsvSettings {
            delimiter: "::".to_string(),
            ..Default::default()
        })
        .unwrap(),
    );
    let multi_input = input.replace(',', "::").replace("\"quoted:: with", "\"quoted, with");
    group.bench_function("double_colon_delimiter", |b| {
        b.iter(|| read_all(black_box(&multi_input), &multi))
    });

    group.finish();
}

criterion_group!(benches, bench_tokenizer);
criterion_main!(benches);
