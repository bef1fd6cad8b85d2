//! Privacy and utility reports.
//!
//! This module bundles the metrics into reports:
//! - **Configuration**: attribute mode and optional acceptance thresholds
//! - **Analysis**: all nine privacy metrics over one shared partition, with
//!   threshold violations
//! - **Utility**: information-loss metrics for an anonymized table
//! - **Rendering**: text through askama templates, JSON validated against an
//!   embedded schema
//!
//! # Example
//! ```rust
//! use anonscope_core::models::{Table, Value};
//! use anonscope_core::report::{AnalysisConfig, PrivacyAnalyzer, render_json};
//!
//! let table = Table::new(
//!     vec!["zip".to_string(), "disease".to_string()],
//!     vec![
//!         vec![Value::from("280"), Value::from("flu")],
//!         vec![Value::from("280"), Value::from("cold")],
//!     ],
//! )?;
//!
//! let report = PrivacyAnalyzer::new(AnalysisConfig::default())
//!     .analyze(&table, &["zip"], &["disease"])?;
//! let json = render_json(&report)?;
//! assert!(json.contains("\"k_anonymity\": 2"));
//! # Ok::<(), anonscope_core::AnonScopeError>(())
//! ```

mod analyzer;
mod config;
mod models;
mod render;
mod schema;

pub use analyzer::{PrivacyAnalyzer, analyze_utility};
pub use config::{AnalysisConfig, ConfigValidationError, PrivacyThresholds};
pub use models::{
    DataSummary, PrivacyReport, REPORT_FORMAT_VERSION, ThresholdKind, ThresholdViolation,
    UtilityReport, ViolationSeverity,
};
pub use render::{render_json, render_text, render_utility_json, render_utility_text};
pub use schema::{ReportKind, schema_definition, validate_report};
