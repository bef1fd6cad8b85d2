//! Error types for anonscope operations.
//!
//! Structural errors (unknown columns, unsupported files, unsupported
//! attribute types) abort the current call with no partial result. A
//! recursive (c,l)-diversity `c` that cannot be computed is not an error;
//! it is reported as `None` by the metric itself.

use thiserror::Error;

use crate::models::ColumnKind;

/// Role a column plays in a single metric call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// Quasi-identifier column
    QuasiIdentifier,
    /// Sensitive attribute column
    SensitiveAttribute,
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnRole::QuasiIdentifier => write!(f, "quasi-identifier"),
            ColumnRole::SensitiveAttribute => write!(f, "sensitive attribute"),
        }
    }
}

/// Main error type for anonscope operations.
#[derive(Debug, Error)]
pub enum AnonScopeError {
    /// One or more requested columns are absent from the table
    #[error("Columns not found in table: {}", .columns.join(", "))]
    ColumnNotFound { columns: Vec<String> },

    /// Input file extension is not supported by the loader
    #[error("Unsupported file format '{extension}' (expected csv, txt, tsv, json, xlsx, xls or ods)")]
    Format { extension: String },

    /// t-closeness needs at least one non-null sensitive value
    #[error("Unsupported attribute type for '{column}': column is {kind}")]
    UnsupportedAttributeType { column: String, kind: ColumnKind },

    /// Aggregating metrics are undefined over a table with no records
    #[error("Table has no records")]
    EmptyTable,

    /// A metric needs at least one column of the given role
    #[error("No {role} columns were supplied")]
    EmptySelection { role: ColumnRole },

    /// Table construction or file layout is invalid
    #[error("Malformed table: {message}")]
    MalformedTable { message: String },

    /// Configuration or threshold error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Delimited text or spreadsheet could not be parsed
    #[error("Parsing failed: {context}")]
    Parse {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Text report template failed to render
    #[error("Report rendering failed: {source}")]
    Render {
        #[from]
        source: askama::Error,
    },

    /// A generated report does not match the report schema
    #[error("Report validation failed with {} errors: {errors:?}", .errors.len())]
    ReportValidation { errors: Vec<String> },
}

/// Convenience type alias for Results with AnonScopeError
pub type Result<T> = std::result::Result<T, AnonScopeError>;

impl AnonScopeError {
    /// Creates a column-not-found error listing every missing name
    pub fn columns_not_found<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ColumnNotFound {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an unsupported-format error for the given extension
    pub fn unsupported_format(extension: impl Into<String>) -> Self {
        Self::Format {
            extension: extension.into(),
        }
    }

    /// Creates a malformed-table error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedTable {
            message: message.into(),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates a parse error with context
    pub fn parse_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Parse {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a serialization error with context
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_not_found_lists_every_column() {
        let error = AnonScopeError::columns_not_found(["age", "zip"]);
        let message = error.to_string();

        assert!(message.contains("age"));
        assert!(message.contains("zip"));
    }

    #[test]
    fn test_format_error_names_extension() {
        let error = AnonScopeError::unsupported_format("parquet");
        assert!(error.to_string().contains("'parquet'"));
    }

    #[test]
    fn test_unsupported_attribute_type_message() {
        let error = AnonScopeError::UnsupportedAttributeType {
            column: "score".to_string(),
            kind: ColumnKind::Empty,
        };
        assert_eq!(
            error.to_string(),
            "Unsupported attribute type for 'score': column is empty"
        );
    }

    #[test]
    fn test_empty_selection_names_role() {
        let error = AnonScopeError::EmptySelection {
            role: ColumnRole::SensitiveAttribute,
        };
        assert_eq!(error.to_string(), "No sensitive attribute columns were supplied");
    }

    #[test]
    fn test_error_creation() {
        let error = AnonScopeError::configuration("min_k must be positive");
        assert!(error.to_string().contains("min_k must be positive"));

        let error = AnonScopeError::malformed("row 3 has 2 fields, expected 4");
        assert!(error.to_string().contains("row 3"));
    }
}
