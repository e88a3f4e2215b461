use sales_summary::config::TextEncoding;
use sales_summary::ingestion::{parse, parse_reader, CsvFormat};
use sales_summary::types::{DataType, Value};
use sales_summary::PipelineError;

fn reader(input: &str) -> csv::Reader<&[u8]> {
    CsvFormat::default().reader_builder().from_reader(input.as_bytes())
}

#[test]
fn parse_orders_fixture_trims_headers_and_skips_malformed_line() {
    let parsed = parse("tests/fixtures/sales/orders.csv", &CsvFormat::default()).unwrap();
    let ds = &parsed.dataset;

    assert_eq!(
        ds.schema.field_names().collect::<Vec<_>>(),
        vec!["Order ID", "Customer ID", "Product ID", "Sales", "Profit"]
    );
    assert_eq!(ds.row_count(), 7);
    assert_eq!(parsed.skipped.len(), 1);
    assert_eq!(ds.schema.fields[3].data_type, DataType::Float64);
    assert_eq!(ds.rows[2][4], Value::Float64(-4.5));
    assert_eq!(ds.rows[0][0], Value::Utf8("O1".to_string()));
}

#[test]
fn parse_customers_fixture_decodes_latin1() {
    let parsed = parse("tests/fixtures/sales/customers.csv", &CsvFormat::default()).unwrap();
    assert!(parsed.skipped.is_empty());
    assert_eq!(parsed.dataset.rows[0][1], Value::Utf8("Zoë Adams".to_string()));
    assert_eq!(parsed.dataset.rows[2][1], Value::Utf8("Chloé Martin".to_string()));
}

#[test]
fn latin1_file_read_as_utf8_skips_undecodable_records() {
    let format = CsvFormat {
        encoding: TextEncoding::Utf8,
        ..CsvFormat::default()
    };
    let parsed = parse("tests/fixtures/sales/customers.csv", &format).unwrap();
    assert_eq!(parsed.dataset.row_count(), 1);
    assert_eq!(parsed.skipped.len(), 2);
    assert_eq!(parsed.dataset.rows[0][0], Value::Utf8("C2".to_string()));
}

#[test]
fn short_and_long_records_are_both_skipped() {
    let input = "id;qty\n1;2\n3\n4;5;6\n7;8\n";
    let parsed = parse_reader(&mut reader(input), TextEncoding::Latin1).unwrap();
    assert_eq!(parsed.dataset.row_count(), 2);
    assert_eq!(parsed.skipped.len(), 2);
    assert_eq!(parsed.dataset.schema.fields[1].data_type, DataType::Int64);
    assert_eq!(parsed.dataset.rows[1], vec![Value::Int64(7), Value::Int64(8)]);
}

#[test]
fn column_types_are_inferred_from_kept_records() {
    let input = "id;price;active;note;blank\n1;2.5;true;a;\n2;3;false; b ;\n3;;true;7;\n";
    let ds = parse_reader(&mut reader(input), TextEncoding::Latin1)
        .unwrap()
        .dataset;

    let types: Vec<DataType> = ds.schema.fields.iter().map(|f| f.data_type).collect();
    assert_eq!(
        types,
        vec![
            DataType::Int64,
            DataType::Float64,
            DataType::Bool,
            DataType::Utf8,
            DataType::Utf8,
        ]
    );
    assert_eq!(ds.rows[1][3], Value::Utf8(" b ".to_string()));
    assert_eq!(ds.rows[1][1], Value::Float64(3.0));
    assert_eq!(ds.rows[2][1], Value::Null);
    assert_eq!(ds.rows[0][4], Value::Null);
}

#[test]
fn text_cells_keep_surrounding_whitespace_but_headers_do_not() {
    let input = " Customer ID ;Customer Name\n C1 ;  Alice \n";
    let ds = parse_reader(&mut reader(input), TextEncoding::Latin1)
        .unwrap()
        .dataset;
    assert_eq!(
        ds.schema.field_names().collect::<Vec<_>>(),
        vec!["Customer ID", "Customer Name"]
    );
    assert_eq!(
        ds.rows[0],
        vec![Value::Utf8(" C1 ".to_string()), Value::Utf8("  Alice ".to_string())]
    );
}

#[test]
fn header_only_file_yields_empty_dataset() {
    let parsed = parse_reader(&mut reader("a;b\n"), TextEncoding::Latin1).unwrap();
    assert_eq!(parsed.dataset.row_count(), 0);
    assert_eq!(parsed.dataset.schema.fields.len(), 2);
}

#[test]
fn duplicate_header_is_schema_mismatch() {
    let err = parse_reader(&mut reader("id; id\n1;2\n"), TextEncoding::Latin1).unwrap_err();
    assert!(matches!(err, PipelineError::SchemaMismatch { .. }));
}

#[test]
fn missing_file_is_io_error() {
    let err = parse("tests/fixtures/sales/does_not_exist.csv", &CsvFormat::default()).unwrap_err();
    match err {
        PipelineError::Csv(e) => assert!(matches!(e.kind(), csv::ErrorKind::Io(_))),
        PipelineError::Io(_) => {}
        other => panic!("expected an I/O error, got {other}"),
    }
}
