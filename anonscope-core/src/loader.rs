//! File loading and writing for tables.
//!
//! The loader is picked from the file extension:
//!
//! | Extension | Loader |
//! |---|---|
//! | `csv`, `txt` | comma-delimited, header row |
//! | `tsv` | tab-delimited, header row |
//! | `json` | array of flat objects |
//! | `xlsx`, `xls`, `ods` | first worksheet, header row (`spreadsheet` feature) |
//!
//! Every text cell goes through [`Value::parse`]: empty cells become
//! `Null`, finite numbers become `Number`, anything else stays `Text`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{AnonScopeError, Result};
use crate::models::{Table, Value};

/// A source of tables in one file format.
pub trait TableLoader {
    /// Reads the whole file into a table.
    fn load(&self, path: &Path) -> Result<Table>;
}

/// Delimited text with a header row.
#[derive(Debug, Clone, Copy)]
pub struct DelimitedLoader {
    delimiter: u8,
}

impl DelimitedLoader {
    /// Comma-separated values.
    pub fn comma() -> Self {
        Self { delimiter: b',' }
    }

    /// Tab-separated values.
    pub fn tab() -> Self {
        Self { delimiter: b'\t' }
    }
}

impl TableLoader for DelimitedLoader {
    fn load(&self, path: &Path) -> Result<Table> {
        let context = || format!("reading {}", path.display());

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_path(path)
            .map_err(|e| AnonScopeError::parse_failed(context(), e))?;

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| AnonScopeError::parse_failed(context(), e))?
            .iter()
            .map(String::from)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| AnonScopeError::parse_failed(context(), e))?;
            rows.push(record.iter().map(Value::parse).collect());
        }

        Table::new(columns, rows)
    }
}

/// A JSON array of flat objects.
///
/// Column order follows the first object; keys first seen in later objects
/// are appended. A key missing from an object is `Null` for that record.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

impl JsonLoader {
    fn cell(key: &str, value: &serde_json::Value) -> Result<Value> {
        match value {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(flag) => Ok(Value::Text(flag.to_string())),
            serde_json::Value::Number(number) => Ok(number
                .as_f64()
                .filter(|n| n.is_finite())
                .map_or_else(|| Value::Text(number.to_string()), Value::Number)),
            serde_json::Value::String(text) => Ok(Value::parse(text)),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(
                AnonScopeError::malformed(format!("field '{}' is not a scalar value", key)),
            ),
        }
    }
}

impl TableLoader for JsonLoader {
    fn load(&self, path: &Path) -> Result<Table> {
        let file = File::open(path)
            .map_err(|e| AnonScopeError::io(format!("opening {}", path.display()), e))?;
        let records: Vec<serde_json::Map<String, serde_json::Value>> =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| {
                AnonScopeError::serialization(
                    format!("{} is not an array of JSON objects", path.display()),
                    e,
                )
            })?;

        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| match record.get(column) {
                        Some(value) => Self::cell(column, value),
                        None => Ok(Value::Null),
                    })
                    .collect::<Result<Vec<Value>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Table::new(columns, rows)
    }
}

/// First worksheet of an Excel or OpenDocument workbook.
#[cfg(feature = "spreadsheet")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetLoader;

#[cfg(feature = "spreadsheet")]
impl SpreadsheetLoader {
    fn cell(data: &calamine::Data) -> Value {
        use calamine::Data;

        match data {
            Data::Empty => Value::Null,
            Data::Int(n) => Value::Number(*n as f64),
            Data::Float(n) if n.is_finite() => Value::Number(*n),
            Data::String(text) => Value::parse(text),
            other => Value::parse(&other.to_string()),
        }
    }

    fn error(path: &Path, error: &calamine::Error) -> AnonScopeError {
        AnonScopeError::Parse {
            context: format!("reading workbook {}", path.display()),
            source: error.to_string().into(),
        }
    }
}

#[cfg(feature = "spreadsheet")]
impl TableLoader for SpreadsheetLoader {
    fn load(&self, path: &Path) -> Result<Table> {
        use calamine::Reader;

        let mut workbook =
            calamine::open_workbook_auto(path).map_err(|e| Self::error(path, &e))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| {
                AnonScopeError::malformed(format!("{} has no worksheets", path.display()))
            })?
            .map_err(|e| Self::error(path, &e))?;

        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Table::empty(Vec::new());
        };
        let columns: Vec<String> = header.iter().map(ToString::to_string).collect();
        let rows = rows
            .map(|row| row.iter().map(Self::cell).collect())
            .collect();

        Table::new(columns, rows)
    }
}

/// Returns the loader for a file extension (case-insensitive).
///
/// # Errors
/// Returns `Format` for an unsupported extension.
pub fn loader_for(extension: &str) -> Result<Box<dyn TableLoader>> {
    match extension.to_lowercase().as_str() {
        "csv" | "txt" => Ok(Box::new(DelimitedLoader::comma())),
        "tsv" => Ok(Box::new(DelimitedLoader::tab())),
        "json" => Ok(Box::new(JsonLoader)),
        #[cfg(feature = "spreadsheet")]
        "xlsx" | "xls" | "ods" => Ok(Box::new(SpreadsheetLoader)),
        _ => Err(AnonScopeError::unsupported_format(extension)),
    }
}

/// Loads a table, choosing the format from the file extension.
///
/// # Errors
/// - `Format` for unsupported extensions
/// - `Io`, `Parse` or `Serialization` if the file cannot be read
/// - `MalformedTable` for duplicate headers or ragged records
pub fn load(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    let table = loader_for(extension)?.load(path)?;
    tracing::debug!(
        "Loaded {} records with {} columns from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );
    Ok(table)
}

/// Writes a table as comma-separated values with a header row.
///
/// `Null` cells are written as empty fields.
pub fn write_csv(table: &Table, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let context = || format!("writing {}", path.display());

    let mut writer =
        csv::Writer::from_path(path).map_err(|e| AnonScopeError::parse_failed(context(), e))?;
    writer
        .write_record(table.columns())
        .map_err(|e| AnonScopeError::parse_failed(context(), e))?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(ToString::to_string))
            .map_err(|e| AnonScopeError::parse_failed(context(), e))?;
    }
    writer
        .flush()
        .map_err(|e| AnonScopeError::io(context(), e))?;

    tracing::debug!("Wrote {} records to {}", table.len(), path.display());
    Ok(())
}
