//! Delimited text parsing.
//!
//! Files are read as raw bytes and decoded per field, so the text encoding is a property of the
//! [`CsvFormat`] rather than of the reader. Records that cannot be used (wrong field count,
//! undecodable bytes, broken quoting) are skipped and listed in [`ParsedCsv::skipped`]; only
//! problems with the file itself or its header row are errors.

use std::collections::HashSet;
use std::path::Path;

use crate::config::TextEncoding;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Delimiter and encoding of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvFormat {
    /// Single-byte field delimiter.
    pub delimiter: u8,
    /// Text encoding of header and fields.
    pub encoding: TextEncoding,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            delimiter: b';',
            encoding: TextEncoding::Latin1,
        }
    }
}

impl CsvFormat {
    /// A [`csv::ReaderBuilder`] configured for this format.
    ///
    /// Records must have as many fields as the header (`flexible(false)`), so short or long
    /// records surface as errors the parser can skip.
    pub fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(false);
        builder
    }
}

/// A record left out of the parsed dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// 1-based line number in the source file (0 if unknown).
    pub line: u64,
    /// Why the record was skipped.
    pub reason: String,
}

/// Result of parsing one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCsv {
    /// Well-formed records, typed per column.
    pub dataset: DataSet,
    /// Records that were skipped.
    pub skipped: Vec<SkippedRecord>,
}

/// Parse the delimited file at `path`.
pub fn parse(path: impl AsRef<Path>, format: &CsvFormat) -> PipelineResult<ParsedCsv> {
    let mut rdr = format.reader_builder().from_path(path)?;
    parse_reader(&mut rdr, format.encoding)
}

/// Parse from an existing CSV reader (which must be configured with headers).
///
/// Column names are the decoded header fields with surrounding whitespace trimmed. Column types
/// are inferred from the kept records: `Int64` if every non-empty cell is an integer, else
/// `Float64` if every one is a number, else `Bool` if every one is `true`/`false`, else `Utf8`.
/// Blank cells are [`Value::Null`]. Surrounding whitespace is ignored when typing numbers and
/// booleans; text cells keep it.
pub fn parse_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    encoding: TextEncoding,
) -> PipelineResult<ParsedCsv> {
    let names = read_header(rdr, encoding)?;

    let mut cells: Vec<Vec<String>> = Vec::new();
    let mut skipped = Vec::new();
    let mut record = csv::ByteRecord::new();
    loop {
        match rdr.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                let line = record.position().map_or(0, |p| p.line());
                match decode_record(&record, encoding) {
                    Some(row) => cells.push(row),
                    None => skipped.push(SkippedRecord {
                        line,
                        reason: format!("record is not valid {encoding:?} text"),
                    }),
                }
            }
            Err(err) if matches!(err.kind(), csv::ErrorKind::Io(_)) => return Err(err.into()),
            Err(err) => skipped.push(SkippedRecord {
                line: err.position().map_or(0, |p| p.line()),
                reason: err.to_string(),
            }),
        }
    }

    let types: Vec<DataType> = (0..names.len()).map(|idx| infer_type(&cells, idx)).collect();
    let rows = cells
        .iter()
        .map(|row| {
            row.iter()
                .zip(&types)
                .map(|(raw, data_type)| typed_value(raw, *data_type))
                .collect()
        })
        .collect();
    let fields = names
        .into_iter()
        .zip(types)
        .map(|(name, data_type)| Field::new(name, data_type))
        .collect();

    Ok(ParsedCsv {
        dataset: DataSet::new(Schema::new(fields), rows),
        skipped,
    })
}

fn read_header<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    encoding: TextEncoding,
) -> PipelineResult<Vec<String>> {
    let headers = rdr.byte_headers()?.clone();
    if headers.is_empty() {
        return Err(PipelineError::schema("file has no header row"));
    }
    let names = decode_record(&headers, encoding)
        .ok_or_else(|| PipelineError::schema(format!("header is not valid {encoding:?} text")))?
        .into_iter()
        .map(|h| h.trim().to_owned())
        .collect::<Vec<_>>();

    let mut seen = HashSet::new();
    if let Some(dup) = names.iter().find(|n| !seen.insert(n.as_str())) {
        return Err(PipelineError::schema(format!(
            "duplicate column '{dup}'. headers={names:?}"
        )));
    }
    Ok(names)
}

fn decode_record(record: &csv::ByteRecord, encoding: TextEncoding) -> Option<Vec<String>> {
    record.iter().map(|field| decode(field, encoding)).collect()
}

fn decode(bytes: &[u8], encoding: TextEncoding) -> Option<String> {
    match encoding {
        // Latin-1 code points coincide with their byte values.
        TextEncoding::Latin1 => Some(bytes.iter().copied().map(char::from).collect()),
        TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
    }
}

fn infer_type(cells: &[Vec<String>], idx: usize) -> DataType {
    let mut present = cells
        .iter()
        .filter_map(|row| row.get(idx))
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
        .peekable();
    if present.peek().is_none() {
        return DataType::Utf8;
    }

    let (mut int, mut float, mut boolean) = (true, true, true);
    for raw in present {
        int = int && raw.parse::<i64>().is_ok();
        float = float && raw.parse::<f64>().is_ok();
        boolean = boolean && parse_bool(raw).is_some();
        if !(int || float || boolean) {
            return DataType::Utf8;
        }
    }

    if int {
        DataType::Int64
    } else if float {
        DataType::Float64
    } else if boolean {
        DataType::Bool
    } else {
        DataType::Utf8
    }
}

fn typed_value(raw: &str, data_type: DataType) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }

    // `infer_type` already checked that every cell parses as `data_type`.
    match data_type {
        DataType::Int64 => trimmed.parse().map_or(Value::Null, Value::Int64),
        DataType::Float64 => trimmed.parse().map_or(Value::Null, Value::Float64),
        DataType::Bool => parse_bool(trimmed).map_or(Value::Null, Value::Bool),
        DataType::Utf8 => Value::Utf8(raw.to_owned()),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
