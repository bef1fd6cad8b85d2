//! Tests for column validation.

use super::*;
use crate::models::Value;

fn table() -> Table {
    Table::new(
        vec!["age".to_string(), "zip".to_string(), "disease".to_string()],
        vec![vec![Value::from(30), Value::from("28001"), Value::from("flu")]],
    )
    .unwrap()
}

#[test]
fn test_valid_columns_pass() {
    assert!(validate_columns(&table(), &["age", "zip"], &["disease"]).is_ok());
}

#[test]
fn test_missing_columns_reported_together() {
    let error = validate_columns(&table(), &["age", "gender"], &["income", "disease"]).unwrap_err();

    match error {
        AnonScopeError::ColumnNotFound { columns } => {
            assert_eq!(columns, vec!["gender".to_string(), "income".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_column_reported_once() {
    let error = validate_columns(&table(), &["gender"], &["gender"]).unwrap_err();

    match error {
        AnonScopeError::ColumnNotFound { columns } => assert_eq!(columns, vec!["gender"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_column_may_be_both_roles() {
    assert!(validate_columns(&table(), &["disease"], &["disease"]).is_ok());
}

#[test]
fn test_validate_quasi_identifiers() {
    assert!(validate_quasi_identifiers(&table(), &["age"]).is_ok());
    assert!(validate_quasi_identifiers(&table(), &["height"]).is_err());
    assert!(validate_quasi_identifiers::<&str>(&table(), &[]).is_ok());
}

#[test]
fn test_require_sensitive_attributes() {
    assert!(require_sensitive_attributes(&["disease"]).is_ok());
    assert!(matches!(
        require_sensitive_attributes::<&str>(&[]),
        Err(AnonScopeError::EmptySelection {
            role: ColumnRole::SensitiveAttribute
        })
    ));
}

#[test]
fn test_resolve_columns() {
    assert_eq!(resolve_columns(&table(), &["disease", "age"]).unwrap(), vec![2, 0]);
    assert!(resolve_columns(&table(), &["disease", "weight"]).is_err());
}
