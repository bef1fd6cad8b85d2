//! Core engine for anonscope.
//!
//! This crate measures how well a published table protects the people in it.
//! Records are grouped into equivalence classes by their quasi-identifier
//! values, and the distribution of sensitive attributes inside each class is
//! compared with the whole table.
//!
//! # Guarantees
//! - Metrics never modify their input table
//! - Every metric validates its columns before reading the table
//! - Results are deterministic for a given table and column selection
//!
//! # Architecture
//! - `models` and `loader` hold and read tabular data
//! - `partition` and `scope` build equivalence classes once per column set
//! - `metrics` computes the nine privacy metrics over a scope
//! - `suppression` and `utility` transform tables and measure information loss
//! - `report` bundles everything into validated text and JSON reports

pub mod distribution;
pub mod error;
pub mod loader;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod partition;
pub mod report;
pub mod scope;
pub mod suppression;
pub mod utility;
pub mod validation;

// Re-export commonly used types
pub use error::{AnonScopeError, ColumnRole, Result};
pub use loader::{load, write_csv};
pub use logging::init_logging;
pub use models::{ColumnKind, Table, Value};
pub use partition::{EquivalenceClass, Partition, partition};
pub use report::{AnalysisConfig, PrivacyAnalyzer, PrivacyReport, UtilityReport};
pub use scope::{AttributeMode, AttributeScope};
pub use suppression::achieve_l_diversity;
