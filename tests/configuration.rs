use rust_csv_streaming::{Configuration, CsvError, CsvReader, CsvSettings, Encoding};

#[test]
fn settings_deserialize_from_key_value_json_with_defaults() {
    let json = r#"{
        "delimiter": "||",
        "allow_comments": true,
        "comment": ";",
        "encoding": "latin1",
        "buffer_size": 16
    }"#;
    let settings: CsvSettings = serde_json::from_str(json).unwrap();

    assert_eq!(settings.delimiter, "||");
    assert_eq!(settings.comment, ';');
    assert_eq!(settings.encoding, Encoding::Latin1);
    assert_eq!(settings.buffer_size, 16);
    // untouched keys keep their defaults
    assert_eq!(settings.quote, '"');
    assert!(settings.skip_blank_lines);

    let config = Configuration::try_from(settings).unwrap();
    let mut reader = CsvReader::new("; note\na||b\n".as_bytes(), config);
    assert_eq!(reader.read_record().unwrap().unwrap(), vec!["a", "b"]);
}

#[test]
fn settings_round_trip_through_json() {
    let settings = CsvSettings {
        delimiter: "\t".to_string(),
        trim_fields: true,
        ..Default::default()
    };
    let json = serde_json::to_string(&settings).unwrap();
    let back: CsvSettings = serde_json::from_str(&json).unwrap();
    assert_eq!(back, settings);
}

#[test]
fn invalid_settings_fail_at_construction() {
    let err = Configuration::new(CsvSettings {
        delimiter: String::new(),
        ..Default::default()
    })
    .unwrap_err();
    assert!(matches!(err, CsvError::Configuration { .. }));
    assert!(err.to_string().contains("configuration error"));
}

#[test]
fn configuration_is_shared_between_readers() {
    let config = std::sync::Arc::new(
        Configuration::new(CsvSettings {
            delimiter: ";".to_string(),
            ..Default::default()
        })
        .unwrap(),
    );

    let handles: Vec<_> = ["a;b\n", "c;d\n"]
        .into_iter()
        .map(|input| {
            let config = std::sync::Arc::clone(&config);
            std::thread::spawn(move || {
                let mut reader = CsvReader::new(input.as_bytes(), config);
                reader.read_record().unwrap().unwrap().to_vec()
            })
        })
        .collect();

    let rows: Vec<Vec<String>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
}

#[test]
fn debug_output_hides_callbacks() {
    let config = Configuration::default().with_bad_data_callback(|_| {});
    let text = format!("{config:?}");
    assert!(text.contains("bad_data_callback_set: true"));
    assert!(text.contains("observer_set: false"));
}
