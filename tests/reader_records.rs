use rust_csv_streaming::{Configuration, CsvError, CsvReader, CsvSettings, Record};

fn read_all(input: &str, settings: CsvSettings) -> Vec<Vec<String>> {
    let config = Configuration::new(settings).unwrap();
    let mut reader = CsvReader::new(input.as_bytes(), config);
    reader.records().map(|r| r.unwrap().to_vec()).collect()
}

#[test]
fn read_people_fixture_from_path() {
    let mut reader =
        CsvReader::from_path("tests/fixtures/people.csv", Configuration::default()).unwrap();

    let header = reader.read_record().unwrap().unwrap();
    assert_eq!(header, vec!["id", "name", "score", "active"]);

    let first = reader.read_record().unwrap().unwrap();
    assert_eq!(first, vec!["1", "Ada", "98.5", "true"]);

    let second = reader.read_record().unwrap().unwrap();
    assert_eq!(second.get(1), Some("Grace \"Amazing\" Hopper"));
    assert_eq!(second.logical_row(), 3);
    assert_eq!(second.raw_row(), 3);

    assert!(reader.read_record().unwrap().is_none());
    assert_eq!(reader.field_count(), Some(4));
}

#[test]
fn from_path_reports_missing_file_as_stream_error() {
    let err = CsvReader::from_path("tests/fixtures/does_not_exist.csv", Configuration::default())
        .err()
        .unwrap();
    assert!(matches!(err, CsvError::Stream(_)));
}

#[test]
fn spreadsheet_export_fixture() {
    let config = Configuration::new(CsvSettings {
        delimiter: ";".to_string(),
        allow_comments: true,
        excel_leading_zero_format: true,
        ..Default::default()
    })
    .unwrap();
    let mut reader = CsvReader::from_path("tests/fixtures/export.csv", config).unwrap();

    let rows: Vec<Vec<String>> = reader.records().map(|r| r.unwrap().to_vec()).collect();
    assert_eq!(
        rows,
        vec![
            vec!["sku", "qty", "note"],
            vec!["00123", "4", "two\r\nlines"],
            vec!["0042", "1", "plain"],
        ]
    );
    assert_eq!(reader.current_raw_row(), 6);
    assert_eq!(reader.current_logical_row(), 3);
}

#[test]
fn simple_fields_split_on_delimiter() {
    for delimiter in [",", ";", "|", "\t"] {
        let line = ["alpha", "", "gamma", "42"].join(delimiter);
        let rows = read_all(
            &format!("{line}\n"),
            CsvSettings {
                delimiter: delimiter.to_string(),
                ..Default::default()
            },
        );
        assert_eq!(rows, vec![vec!["alpha", "", "gamma", "42"]], "delimiter={delimiter:?}");
    }
}

#[test]
fn embedded_break_and_doubled_quote() {
    let rows = read_all("a,\"b,c\nd\"\"e\",f\n", CsvSettings::default());
    assert_eq!(rows, vec![vec!["a", "b,c\nd\"e", "f"]]);
}

#[test]
fn blank_lines_skip_logical_but_not_raw_rows() {
    let mut reader = CsvReader::new("a,b\n\nc,d\n".as_bytes(), Configuration::default());
    let rows: Vec<Vec<String>> = reader.records().map(|r| r.unwrap().to_vec()).collect();
    assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    assert_eq!(reader.current_raw_row(), 3);
    assert_eq!(reader.current_logical_row(), 2);
}

#[test]
fn excel_leading_zeros_are_preserved() {
    let rows = read_all(
        "=\"007\"\n",
        CsvSettings {
            excel_leading_zero_format: true,
            ..Default::default()
        },
    );
    assert_eq!(rows, vec![vec!["007"]]);
    assert_eq!(rows[0][0].len(), 3);
}

#[test]
fn double_colon_delimiter() {
    let settings = CsvSettings {
        delimiter: "::".to_string(),
        ..Default::default()
    };
    assert_eq!(read_all("a::b::c\n", settings.clone()), vec![vec!["a", "b", "c"]]);
    assert_eq!(read_all("a:b::c\n", settings), vec![vec!["a:b", "c"]]);
}

#[test]
fn comment_line_does_not_count_as_record() {
    let config = Configuration::new(CsvSettings {
        allow_comments: true,
        ..Default::default()
    })
    .unwrap();
    let mut reader = CsvReader::new("#ignored\na,b\n".as_bytes(), config);
    let rows: Vec<Vec<String>> = reader.records().map(|r| r.unwrap().to_vec()).collect();
    assert_eq!(rows, vec![vec!["a", "b"]]);
    assert_eq!(reader.current_logical_row(), 1);
    assert_eq!(reader.current_raw_row(), 2);
}

#[test]
fn rereading_same_input_is_deterministic() {
    let input = "x,\"y\"\"\"\r\n\r\n=\"01\",\"multi\nline\",z\n";
    let settings = CsvSettings {
        excel_leading_zero_format: true,
        ..Default::default()
    };
    let first = read_all(input, settings.clone());
    let second = read_all(input, settings);
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn read_record_into_reuses_caller_record() {
    let mut reader = CsvReader::new("a,b,c\nd\n".as_bytes(), Configuration::default());
    let mut record = Record::new();

    assert!(reader.read_record_into(&mut record).unwrap());
    assert_eq!(record, vec!["a", "b", "c"]);

    assert!(reader.read_record_into(&mut record).unwrap());
    assert_eq!(record, vec!["d"]);
    assert_eq!(record.logical_row(), 2);

    assert!(!reader.read_record_into(&mut record).unwrap());
    assert!(record.is_empty());
}

#[test]
fn positions_track_chars_bytes_and_rows() {
    let config = Configuration::new(CsvSettings {
        count_bytes: true,
        ..Default::default()
    })
    .unwrap();
    let mut reader = CsvReader::new("é,b\r\nc\n".as_bytes(), config);

    reader.read_record().unwrap().unwrap();
    assert_eq!(reader.current_char_position(), 5);
    assert_eq!(reader.current_byte_position(), Some(6));
    assert_eq!(reader.raw_record(), "é,b\r\n");

    reader.read_record().unwrap().unwrap();
    let pos = reader.position();
    assert_eq!(pos.char_position, 7);
    assert_eq!(pos.byte_position, Some(8));
    assert_eq!(pos.raw_row, 2);
    assert_eq!(pos.logical_row, 2);
}

#[test]
fn byte_position_is_not_tracked_by_default() {
    let mut reader = CsvReader::new("a\n".as_bytes(), Configuration::default());
    reader.read_record().unwrap();
    assert_eq!(reader.current_byte_position(), None);
}

#[test]
fn latin1_input_decodes_each_byte() {
    let config = Configuration::new(CsvSettings {
        encoding: rust_csv_streaming::Encoding::Latin1,
        ..Default::default()
    })
    .unwrap();
    let bytes: &[u8] = &[b'c', b'a', b'f', 0xE9, b',', b'x', b'\n'];
    let mut reader = CsvReader::new(bytes, config);
    assert_eq!(reader.read_record().unwrap().unwrap(), vec!["café", "x"]);
}

#[test]
fn utf8_byte_order_mark_is_not_part_of_first_field() {
    let mut reader = CsvReader::new("\u{FEFF}id,name\n".as_bytes(), Configuration::default());
    assert_eq!(reader.read_record().unwrap().unwrap(), vec!["id", "name"]);
}

#[test]
fn invalid_utf8_is_a_stream_error_and_ends_iteration() {
    let bytes: &[u8] = &[b'a', b',', 0xFF, b'\n', b'b', b'\n'];
    let mut reader = CsvReader::new(bytes, Configuration::default());
    let results: Vec<_> = reader.records().collect();
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(CsvError::Stream(_))));
}

#[test]
fn invalid_utf8_keeps_failing_instead_of_ending_early() {
    let bytes: &[u8] = b"a,b\xFF\nc,d\n";
    for buffer_size in [1, 2, 4096] {
        let config = Configuration::new(CsvSettings {
            buffer_size,
            ..Default::default()
        })
        .unwrap();
        let mut reader = CsvReader::new(bytes, config);
        for _ in 0..3 {
            assert!(
                matches!(reader.read_record(), Err(CsvError::Stream(_))),
                "buffer_size={buffer_size}"
            );
        }
    }
}

#[test]
fn reads_after_close_are_rejected() {
    let mut reader = CsvReader::new("a\nb\n".as_bytes(), Configuration::default());
    assert!(reader.read_record().unwrap().is_some());

    reader.close();
    assert!(reader.is_closed());
    assert!(matches!(reader.read_record(), Err(CsvError::Disposed)));
    assert_eq!(reader.records().count(), 1);
}

#[test]
fn small_buffers_give_identical_records() {
    let input = "id;;note\r\n1;;\"semi;;colon\r\nand break\"\r\n2;;é€😀\r\n";
    let expected = vec![
        vec!["id", "note"],
        vec!["1", "semi;;colon\r\nand break"],
        vec!["2", "é€😀"],
    ];
    for buffer_size in [1, 2, 3, 5, 7, 4096] {
        let rows = read_all(
            input,
            CsvSettings {
                delimiter: ";;".to_string(),
                buffer_size,
                ..Default::default()
            },
        );
        assert_eq!(rows, expected, "buffer_size={buffer_size}");
    }
}
