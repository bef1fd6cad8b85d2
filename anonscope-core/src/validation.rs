//! Column validation for metric inputs.
//!
//! Every metric validates its own column lists before touching the table,
//! even when a caller has already validated them, so no metric can be run
//! against a column that does not exist.
//!
//! # Example
//! ```rust
//! use anonscope_core::models::{Table, Value};
//! use anonscope_core::validation::validate_columns;
//!
//! let table = Table::new(
//!     vec!["age".to_string(), "disease".to_string()],
//!     vec![vec![Value::from(30), Value::from("flu")]],
//! )?;
//!
//! assert!(validate_columns(&table, &["age"], &["disease"]).is_ok());
//! assert!(validate_columns(&table, &["zip"], &["income"]).is_err());
//! # Ok::<(), anonscope_core::AnonScopeError>(())
//! ```

use crate::error::{AnonScopeError, ColumnRole, Result};
use crate::models::Table;

/// Checks that every quasi-identifier and sensitive attribute exists.
///
/// # Errors
/// Returns `ColumnNotFound` naming every missing column from both lists,
/// in the order they were requested.
pub fn validate_columns<Q, S>(table: &Table, quasi_identifiers: &[Q], sensitive: &[S]) -> Result<()>
where
    Q: AsRef<str>,
    S: AsRef<str>,
{
    let missing: Vec<String> = quasi_identifiers
        .iter()
        .map(AsRef::as_ref)
        .chain(sensitive.iter().map(AsRef::as_ref))
        .filter(|name| !table.has_column(name))
        .fold(Vec::new(), |mut acc, name| {
            if !acc.iter().any(|seen: &String| seen == name) {
                acc.push(name.to_string());
            }
            acc
        });

    if missing.is_empty() {
        Ok(())
    } else {
        tracing::debug!("Column validation failed: missing {:?}", missing);
        Err(AnonScopeError::columns_not_found(missing))
    }
}

/// Checks that every quasi-identifier exists.
pub fn validate_quasi_identifiers<Q: AsRef<str>>(table: &Table, quasi_identifiers: &[Q]) -> Result<()> {
    validate_columns::<Q, &str>(table, quasi_identifiers, &[])
}

/// Checks that at least one sensitive attribute was supplied.
pub fn require_sensitive_attributes<S: AsRef<str>>(sensitive: &[S]) -> Result<()> {
    if sensitive.is_empty() {
        return Err(AnonScopeError::EmptySelection {
            role: ColumnRole::SensitiveAttribute,
        });
    }
    Ok(())
}

/// Resolves column names to schema positions.
///
/// # Errors
/// Returns `ColumnNotFound` naming every missing column.
pub fn resolve_columns<C: AsRef<str>>(table: &Table, columns: &[C]) -> Result<Vec<usize>> {
    let mut positions = Vec::with_capacity(columns.len());
    let mut missing = Vec::new();
    for column in columns {
        match table.column_index(column.as_ref()) {
            Some(position) => positions.push(position),
            None => missing.push(column.as_ref().to_string()),
        }
    }

    if missing.is_empty() {
        Ok(positions)
    } else {
        Err(AnonScopeError::columns_not_found(missing))
    }
}

#[cfg(test)]
mod tests;
