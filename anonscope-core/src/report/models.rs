//! Report data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::{AlphaK, RecursiveDiversity};
use crate::scope::AttributeMode;
use crate::utility::{ClassSizeStats, QuasiIdentifierStats};

/// Version of the JSON report layout.
pub const REPORT_FORMAT_VERSION: &str = "1.0";

/// Severity level for threshold violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationSeverity {
    /// Metric misses its threshold by a small margin
    Warning,
    /// Metric misses its threshold by more than 20%
    Critical,
}

/// Direction in which a threshold bounds a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdKind {
    /// The metric must be at least the threshold
    Minimum,
    /// The metric must be at most the threshold
    Maximum,
}

/// A threshold violation detected during privacy analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdViolation {
    /// Name of the metric that violated its threshold
    pub metric: String,
    /// Whether the threshold is a lower or an upper bound
    pub kind: ThresholdKind,
    /// The configured threshold value
    pub threshold: f64,
    /// The actual measured value
    pub actual: f64,
    /// Severity of the violation
    pub severity: ViolationSeverity,
}

/// Values off by more than this ratio of the threshold are critical.
const CRITICAL_SEVERITY_RATIO: f64 = 0.8;

impl ThresholdViolation {
    /// A metric that fell below its minimum.
    ///
    /// Critical when the value is below 80% of the threshold.
    pub fn below_minimum(metric: impl Into<String>, threshold: f64, actual: f64) -> Self {
        let severity = if actual < threshold * CRITICAL_SEVERITY_RATIO {
            ViolationSeverity::Critical
        } else {
            ViolationSeverity::Warning
        };
        Self {
            metric: metric.into(),
            kind: ThresholdKind::Minimum,
            threshold,
            actual,
            severity,
        }
    }

    /// A metric that rose above its maximum.
    ///
    /// Critical when 80% of the value still exceeds the threshold.
    pub fn above_maximum(metric: impl Into<String>, threshold: f64, actual: f64) -> Self {
        let severity = if actual * CRITICAL_SEVERITY_RATIO > threshold {
            ViolationSeverity::Critical
        } else {
            ViolationSeverity::Warning
        };
        Self {
            metric: metric.into(),
            kind: ThresholdKind::Maximum,
            threshold,
            actual,
            severity,
        }
    }
}

/// Description of the analyzed data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSummary {
    /// Where the table came from, when known
    pub source: Option<String>,
    /// Quasi-identifier columns
    pub quasi_identifiers: Vec<String>,
    /// Sensitive attribute columns
    pub sensitive_attributes: Vec<String>,
    /// Attribute mode the metrics were computed in
    pub mode: AttributeMode,
    /// Number of records
    pub record_count: usize,
    /// Number of quasi-identifier equivalence classes
    pub class_count: usize,
}

/// All nine privacy metrics for one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivacyReport {
    /// Report layout version
    pub format_version: String,
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Analyzed data
    pub data: DataSummary,
    /// k for k-anonymity
    pub k_anonymity: usize,
    /// α and k for (α,k)-anonymity
    pub alpha_k_anonymity: AlphaK,
    /// l for l-diversity
    pub l_diversity: usize,
    /// l for entropy l-diversity
    pub entropy_l_diversity: usize,
    /// c and l for recursive (c,l)-diversity
    pub recursive_c_l_diversity: RecursiveDiversity,
    /// β for basic β-likeness
    pub basic_beta_likeness: f64,
    /// β for enhanced β-likeness
    pub enhanced_beta_likeness: f64,
    /// δ for δ-disclosure privacy
    pub delta_disclosure: f64,
    /// t for t-closeness
    pub t_closeness: f64,
    /// Thresholds the metrics did not meet
    pub threshold_violations: Vec<ThresholdViolation>,
}

impl PrivacyReport {
    /// True when every configured threshold was met.
    pub fn passed(&self) -> bool {
        self.threshold_violations.is_empty()
    }

    /// Number of critical violations.
    pub fn critical_violations(&self) -> usize {
        self.threshold_violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Critical)
            .count()
    }
}

/// Utility of an anonymized table relative to its raw version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityReport {
    /// Report layout version
    pub format_version: String,
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Records in the raw table
    pub raw_records: usize,
    /// Records in the anonymized table
    pub anonymized_records: usize,
    /// Whether records were suppressed during anonymization
    pub suppressed: bool,
    /// Average equivalence class size
    pub average_ec_size: f64,
    /// Classification metric
    pub classification_metric: f64,
    /// Discernability metric
    pub discernability_metric: usize,
    /// Average re-identification risk
    pub average_reidentification_risk: f64,
    /// Equivalence class size statistics
    pub class_sizes: ClassSizeStats,
    /// Per-quasi-identifier statistics on the anonymized table
    pub quasi_identifiers: Vec<QuasiIdentifierStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_below_minimum_severity() {
        let warning = ThresholdViolation::below_minimum("k_anonymity", 5.0, 4.0);
        assert_eq!(warning.kind, ThresholdKind::Minimum);
        assert_eq!(warning.severity, ViolationSeverity::Warning);

        let critical = ThresholdViolation::below_minimum("k_anonymity", 5.0, 2.0);
        assert_eq!(critical.severity, ViolationSeverity::Critical);
    }

    #[test]
    fn test_violation_above_maximum_severity() {
        let warning = ThresholdViolation::above_maximum("t_closeness", 0.2, 0.24);
        assert_eq!(warning.kind, ThresholdKind::Maximum);
        assert_eq!(warning.severity, ViolationSeverity::Warning);

        let critical = ThresholdViolation::above_maximum("t_closeness", 0.2, 0.4);
        assert_eq!(critical.severity, ViolationSeverity::Critical);
    }

    #[test]
    fn test_violation_serializes_lowercase_enums() {
        let violation = ThresholdViolation::above_maximum("delta_disclosure", 1.0, 3.0);
        let json = serde_json::to_value(&violation).unwrap();

        assert_eq!(json["kind"], "maximum");
        assert_eq!(json["severity"], "critical");
        assert_eq!(json["metric"], "delta_disclosure");
    }
}
