//! JSON Schema validation for report output.
//!
//! Both report kinds are checked against an embedded schema before they are
//! written, so a consumer can rely on the layout advertised by
//! `format_version`.

use std::sync::OnceLock;

use jsonschema::Validator;
use serde_json::Value;

use crate::error::{AnonScopeError, Result};

use super::models::REPORT_FORMAT_VERSION;

/// Embedded JSON Schema for privacy reports, v1.0
const PRIVACY_REPORT_SCHEMA_V1_0: &str = r##"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "anonscope privacy report v1.0",
  "type": "object",
  "required": [
    "format_version", "generated_at", "data",
    "k_anonymity", "alpha_k_anonymity", "l_diversity", "entropy_l_diversity",
    "recursive_c_l_diversity", "basic_beta_likeness", "enhanced_beta_likeness",
    "delta_disclosure", "t_closeness", "threshold_violations"
  ],
  "properties": {
    "format_version": { "type": "string", "pattern": "^1\\.0$" },
    "generated_at": { "type": "string", "minLength": 1 },
    "data": {
      "type": "object",
      "required": ["quasi_identifiers", "sensitive_attributes", "mode", "record_count", "class_count"],
      "properties": {
        "source": { "type": ["string", "null"] },
        "quasi_identifiers": { "type": "array", "items": { "type": "string" } },
        "sensitive_attributes": { "type": "array", "items": { "type": "string" }, "minItems": 1 },
        "mode": { "enum": ["generalized", "independent"] },
        "record_count": { "type": "integer", "minimum": 1 },
        "class_count": { "type": "integer", "minimum": 1 }
      }
    },
    "k_anonymity": { "type": "integer", "minimum": 1 },
    "alpha_k_anonymity": {
      "type": "object",
      "required": ["alpha", "k"],
      "properties": {
        "alpha": { "type": "number", "exclusiveMinimum": 0, "maximum": 1 },
        "k": { "type": "integer", "minimum": 1 }
      }
    },
    "l_diversity": { "type": "integer", "minimum": 1 },
    "entropy_l_diversity": { "type": "integer", "minimum": 1 },
    "recursive_c_l_diversity": {
      "type": "object",
      "required": ["c", "l"],
      "properties": {
        "c": { "type": ["integer", "null"], "minimum": 1 },
        "l": { "type": "integer", "minimum": 1 }
      }
    },
    "basic_beta_likeness": { "type": "number", "minimum": 0 },
    "enhanced_beta_likeness": { "type": "number", "minimum": 0 },
    "delta_disclosure": { "type": "number", "minimum": 0 },
    "t_closeness": { "type": "number", "minimum": 0, "maximum": 1 },
    "threshold_violations": { "type": "array", "items": { "$ref": "#/$defs/violation" } }
  },
  "$defs": {
    "violation": {
      "type": "object",
      "required": ["metric", "kind", "threshold", "actual", "severity"],
      "properties": {
        "metric": { "type": "string", "minLength": 1 },
        "kind": { "enum": ["minimum", "maximum"] },
        "threshold": { "type": "number" },
        "actual": { "type": "number" },
        "severity": { "enum": ["warning", "critical"] }
      }
    }
  }
}"##;

/// Embedded JSON Schema for utility reports, v1.0
const UTILITY_REPORT_SCHEMA_V1_0: &str = r##"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "anonscope utility report v1.0",
  "type": "object",
  "required": [
    "format_version", "generated_at", "raw_records", "anonymized_records", "suppressed",
    "average_ec_size", "classification_metric", "discernability_metric",
    "average_reidentification_risk", "class_sizes", "quasi_identifiers"
  ],
  "properties": {
    "format_version": { "type": "string", "pattern": "^1\\.0$" },
    "generated_at": { "type": "string", "minLength": 1 },
    "raw_records": { "type": "integer", "minimum": 0 },
    "anonymized_records": { "type": "integer", "minimum": 0 },
    "suppressed": { "type": "boolean" },
    "average_ec_size": { "type": "number", "minimum": 0 },
    "classification_metric": { "type": "number", "minimum": 0 },
    "discernability_metric": { "type": "integer", "minimum": 0 },
    "average_reidentification_risk": { "type": "number", "exclusiveMinimum": 0, "maximum": 1 },
    "class_sizes": {
      "type": "object",
      "required": ["count", "min", "max", "mean", "median"],
      "properties": {
        "count": { "type": "integer", "minimum": 1 },
        "min": { "type": "integer", "minimum": 1 },
        "max": { "type": "integer", "minimum": 1 },
        "mean": { "type": "number" },
        "median": { "type": "number" }
      }
    },
    "quasi_identifiers": {
      "type": "array",
      "items": {
        "type": "object",
        "required": ["column", "most_frequent", "most_frequent_count", "least_frequent", "least_frequent_count"],
        "properties": {
          "column": { "type": "string" },
          "most_frequent_count": { "type": "integer", "minimum": 1 },
          "least_frequent_count": { "type": "integer", "minimum": 1 },
          "numeric": {
            "oneOf": [
              { "type": "null" },
              {
                "type": "object",
                "required": ["mean", "median", "std_dev", "variance"],
                "properties": {
                  "std_dev": { "type": "number", "minimum": 0 },
                  "variance": { "type": "number", "minimum": 0 }
                }
              }
            ]
          }
        }
      }
    }
  }
}"##;

/// Which report layout a document claims to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// [`PrivacyReport`](super::PrivacyReport)
    Privacy,
    /// [`UtilityReport`](super::UtilityReport)
    Utility,
}

static PRIVACY_VALIDATOR: OnceLock<Validator> = OnceLock::new();
static UTILITY_VALIDATOR: OnceLock<Validator> = OnceLock::new();

fn compiled(kind: ReportKind) -> Result<&'static Validator> {
    let (cell, source) = match kind {
        ReportKind::Privacy => (&PRIVACY_VALIDATOR, PRIVACY_REPORT_SCHEMA_V1_0),
        ReportKind::Utility => (&UTILITY_VALIDATOR, UTILITY_REPORT_SCHEMA_V1_0),
    };
    if let Some(validator) = cell.get() {
        return Ok(validator);
    }

    let schema: Value = serde_json::from_str(source)
        .map_err(|e| AnonScopeError::serialization("parsing embedded report schema", e))?;
    let validator = jsonschema::validator_for(&schema).map_err(|e| {
        AnonScopeError::configuration(format!("report schema compilation error: {}", e))
    })?;

    // another thread may have won the race; either copy is identical
    let _ = cell.set(validator);
    cell.get().ok_or_else(|| {
        AnonScopeError::configuration("report schema validator could not be initialized")
    })
}

/// Validates a report document against its schema.
///
/// # Errors
/// Returns `ReportValidation` for the first schema violation found or an
/// unsupported `format_version`.
pub fn validate_report(kind: ReportKind, document: &Value) -> Result<()> {
    let version = document.get("format_version").and_then(Value::as_str);
    if version != Some(REPORT_FORMAT_VERSION) {
        return Err(AnonScopeError::ReportValidation {
            errors: vec![format!(
                "unsupported format_version {:?}, expected \"{}\"",
                version, REPORT_FORMAT_VERSION
            )],
        });
    }

    let validator = compiled(kind)?;
    if let Err(error) = validator.validate(document) {
        return Err(AnonScopeError::ReportValidation {
            errors: vec![format!("Schema validation failed: {}", error)],
        });
    }

    Ok(())
}

/// Returns the embedded schema of a report kind.
pub fn schema_definition(kind: ReportKind) -> Result<Value> {
    let source = match kind {
        ReportKind::Privacy => PRIVACY_REPORT_SCHEMA_V1_0,
        ReportKind::Utility => UTILITY_REPORT_SCHEMA_V1_0,
    };
    serde_json::from_str(source)
        .map_err(|e| AnonScopeError::serialization("parsing embedded report schema", e))
}
