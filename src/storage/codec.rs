//! CSV codec for the flat 21-column row
//!
//! Decoding is schema-blind: every data line becomes a `FlatRow` keyed by
//! the header, cells kept in header order. A header naming a column twice,
//! or naming `fresh` beside `fresh.production`, is rejected up front so
//! `FlatRow::to_nested` never has to pick a winner.
//!
//! `FlatRow::to_nested` rebuilds the nested JSON shape from dotted column
//! names and re-parses numeric cells, so values loaded from CSV are numbers
//! again rather than text.
//!
//! Encoding always writes `CSV_COLUMNS` in order.

use std::collections::HashSet;

use serde_json::{Map, Number, Value};

use crate::schema::{AppleRecord, CSV_COLUMNS, MARKETING_YEAR};

use super::errors::{StorageError, StorageResult};

/// One decoded data line
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    line: u64,
    cells: Vec<(String, String)>,
}

impl FlatRow {
    /// 1-based line number in the source text
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Raw cell text for a column
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cell)| cell.as_str())
    }

    /// The row's key, if present and non-empty
    pub fn marketing_year(&self) -> Option<&str> {
        self.get(MARKETING_YEAR).filter(|year| !year.is_empty())
    }

    /// Rebuilds the nested record shape.
    ///
    /// `fresh.production` lands at `value["fresh"]["production"]`. Empty
    /// cells become `null`; cells that parse as finite numbers become JSON
    /// numbers; anything else stays a string for the validator to report.
    pub fn to_nested(&self) -> Value {
        let mut root = Map::new();

        for (column, cell) in &self.cells {
            let value = if column == MARKETING_YEAR {
                Value::String(cell.clone())
            } else {
                parse_cell(cell)
            };

            match column.split_once('.') {
                Some((block, field)) => {
                    let entry = root
                        .entry(block.to_string())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(nested) = entry {
                        nested.insert(field.to_string(), value);
                    }
                }
                None => {
                    root.insert(column.clone(), value);
                }
            }
        }

        Value::Object(root)
    }

    /// Converts the row into a typed record without business validation.
    ///
    /// # Errors
    ///
    /// `STORAGE_SCHEMA_MISMATCH` if a column is missing or non-numeric.
    pub fn to_record(&self) -> StorageResult<AppleRecord> {
        serde_json::from_value(self.to_nested())
            .map_err(|e| StorageError::schema_mismatch(Some(self.line), e.to_string()))
    }
}

/// Decoded CSV text
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    columns: Vec<String>,
    rows: Vec<FlatRow>,
}

impl CsvTable {
    /// Header names in file order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows in file order
    pub fn rows(&self) -> &[FlatRow] {
        &self.rows
    }

    /// Fails on the first fixed-schema column the header lacks.
    pub fn require_columns(&self) -> StorageResult<()> {
        for expected in CSV_COLUMNS {
            if !self.columns.iter().any(|c| c == expected) {
                return Err(StorageError::schema_mismatch(
                    Some(1),
                    format!("missing column '{}'", expected),
                ));
            }
        }
        Ok(())
    }
}

/// Decodes CSV text with a header line.
///
/// # Errors
///
/// `STORAGE_MALFORMED_CSV` on unbalanced quotes or a row whose field count
/// differs from the header. `STORAGE_SCHEMA_MISMATCH` if the header repeats
/// a column or uses one both as a plain column and as a dotted prefix.
pub fn decode(text: &str) -> StorageResult<CsvTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    check_header(&columns)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let cells = columns
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        rows.push(FlatRow { line, cells });
    }

    Ok(CsvTable { columns, rows })
}

/// Encodes records as CSV text with the fixed header.
///
/// # Errors
///
/// `STORAGE_SCHEMA_MISMATCH` if a column has no value on a record. Blank
/// cells are never written in its place.
pub fn encode<'a, I>(records: I) -> StorageResult<String>
where
    I: IntoIterator<Item = &'a AppleRecord>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_COLUMNS)?;

    for record in records {
        let mut row = Vec::with_capacity(CSV_COLUMNS.len());
        for column in CSV_COLUMNS {
            if column == MARKETING_YEAR {
                row.push(record.marketing_year.clone());
                continue;
            }
            let value = record.numeric_column(column).ok_or_else(|| {
                StorageError::schema_mismatch(
                    None,
                    format!(
                        "record '{}' has no value for column '{}'",
                        record.marketing_year, column
                    ),
                )
            })?;
            row.push(value.to_string());
        }
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| StorageError::malformed_csv(None, e.to_string()))?;

    String::from_utf8(bytes).map_err(|e| StorageError::malformed_csv(None, e.to_string()))
}

fn check_header(columns: &[String]) -> StorageResult<()> {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.as_str()) {
            return Err(StorageError::schema_mismatch(
                Some(1),
                format!("duplicate column '{}'", column),
            ));
        }
    }

    for column in columns {
        if let Some((block, _)) = column.split_once('.') {
            if seen.contains(block) {
                return Err(StorageError::schema_mismatch(
                    Some(1),
                    format!("column '{}' conflicts with nested column '{}'", block, column),
                ));
            }
        }
    }
    Ok(())
}

fn parse_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = cell.parse::<i64>() {
        return Value::Number(int.into());
    }
    cell.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(cell.to_string()))
}
