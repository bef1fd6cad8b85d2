//! Tabular data model.
//!
//! A [`Table`] is an immutable, row-addressable set of records. Every metric
//! in this crate reads a table and never modifies it; the suppression
//! transform produces a new table instead.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{AnonScopeError, Result};

/// A single cell value.
///
/// Numbers compare and hash by their canonical bit pattern, so `-0.0`
/// equals `0.0` and every NaN equals every other NaN. This makes `Value`
/// usable as a group-by key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing cell
    Null,
    /// Numeric cell
    Number(f64),
    /// Textual (categorical) cell
    Text(String),
}

impl Value {
    /// Parses a raw text cell: empty becomes `Null`, finite numbers become
    /// `Number`, everything else stays `Text`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Value::Number(number),
            _ => Value::Text(raw.to_string()),
        }
    }

    /// Returns the numeric payload, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns true for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn canonical_bits(number: f64) -> u64 {
        if number == 0.0 {
            0.0_f64.to_bits()
        } else if number.is_nan() {
            f64::NAN.to_bits()
        } else {
            number.to_bits()
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Number(_) => 1,
            Value::Text(_) => 2,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Number(a), Value::Number(b)) => {
                Value::canonical_bits(*a) == Value::canonical_bits(*b)
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Number(n) => Value::canonical_bits(*n).hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => {
                if self == other {
                    Ordering::Equal
                } else {
                    a.total_cmp(b)
                }
            }
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// Inferred type of a whole column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Every non-null value is a number
    Numeric,
    /// Every non-null value is text
    Categorical,
    /// Numbers and text are both present
    Mixed,
    /// Only nulls (or no rows)
    Empty,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
            ColumnKind::Mixed => write!(f, "mixed"),
            ColumnKind::Empty => write!(f, "empty"),
        }
    }
}

/// An immutable table of records with named columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates a table from column names and row-major values.
    ///
    /// # Errors
    /// Returns `MalformedTable` if a column name is repeated or a row's
    /// width differs from the number of columns.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        for (position, name) in columns.iter().enumerate() {
            if columns[..position].contains(name) {
                return Err(AnonScopeError::malformed(format!(
                    "duplicate column name '{}'",
                    name
                )));
            }
        }

        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(AnonScopeError::malformed(format!(
                "row {} has {} fields, expected {}",
                index,
                row.len(),
                columns.len()
            )));
        }

        Ok(Self { columns, rows })
    }

    /// Creates a table with the given columns and no rows.
    pub fn empty(columns: Vec<String>) -> Result<Self> {
        Self::new(columns, Vec::new())
    }

    /// Column names in schema order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in index order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no records.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column in the schema.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Returns true if the column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// The value at `(row, column)`; `column` is a schema position.
    pub fn value(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Iterates the values of one column in row order.
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().filter_map(move |row| row.get(column))
    }

    /// Infers the kind of a column from its non-null values.
    pub fn column_kind(&self, column: usize) -> ColumnKind {
        let mut numeric = false;
        let mut text = false;
        for value in self.column_values(column) {
            match value {
                Value::Number(_) => numeric = true,
                Value::Text(_) => text = true,
                Value::Null => {}
            }
        }
        match (numeric, text) {
            (true, false) => ColumnKind::Numeric,
            (false, true) => ColumnKind::Categorical,
            (true, true) => ColumnKind::Mixed,
            (false, false) => ColumnKind::Empty,
        }
    }

    /// Builds a new table holding only the given rows, in the given order,
    /// renumbered from 0. Indices out of range are skipped.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&index| self.rows.get(index).cloned())
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
