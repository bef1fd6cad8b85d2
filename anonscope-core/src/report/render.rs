//! Text and JSON rendering of reports.
//!
//! JSON output is validated against the embedded report schema before it is
//! returned. Text output uses askama templates from `templates/`.

use askama::Template;

use crate::error::{AnonScopeError, Result};

use super::models::{PrivacyReport, ThresholdKind, UtilityReport};
use super::schema::{ReportKind, validate_report};

fn decimal(value: f64) -> String {
    format!("{:.4}", value)
}

struct ViolationLine {
    metric: String,
    relation: &'static str,
    threshold: String,
    actual: String,
    severity: String,
}

#[derive(Template)]
#[template(path = "privacy_report.txt")]
struct PrivacyReportText {
    mode: String,
    generated_at: String,
    source: String,
    record_count: usize,
    class_count: usize,
    quasi_identifiers: String,
    sensitive_attributes: String,
    k: usize,
    alpha: String,
    alpha_k: usize,
    l: usize,
    entropy_l: usize,
    recursive_c: String,
    recursive_l: usize,
    basic_beta: String,
    enhanced_beta: String,
    delta: String,
    t: String,
    violations: Vec<ViolationLine>,
}

impl From<&PrivacyReport> for PrivacyReportText {
    fn from(report: &PrivacyReport) -> Self {
        let list = |columns: &[String]| {
            if columns.is_empty() {
                "(none)".to_string()
            } else {
                columns.join(", ")
            }
        };

        Self {
            mode: report.data.mode.to_string(),
            generated_at: report.generated_at.to_rfc3339(),
            source: report
                .data
                .source
                .clone()
                .unwrap_or_else(|| "(in memory)".to_string()),
            record_count: report.data.record_count,
            class_count: report.data.class_count,
            quasi_identifiers: list(&report.data.quasi_identifiers),
            sensitive_attributes: list(&report.data.sensitive_attributes),
            k: report.k_anonymity,
            alpha: decimal(report.alpha_k_anonymity.alpha),
            alpha_k: report.alpha_k_anonymity.k,
            l: report.l_diversity,
            entropy_l: report.entropy_l_diversity,
            recursive_c: report
                .recursive_c_l_diversity
                .c
                .map_or_else(|| "not applicable".to_string(), |c| c.to_string()),
            recursive_l: report.recursive_c_l_diversity.l,
            basic_beta: decimal(report.basic_beta_likeness),
            enhanced_beta: decimal(report.enhanced_beta_likeness),
            delta: decimal(report.delta_disclosure),
            t: decimal(report.t_closeness),
            violations: report
                .threshold_violations
                .iter()
                .map(|v| ViolationLine {
                    metric: v.metric.clone(),
                    relation: match v.kind {
                        ThresholdKind::Minimum => ">=",
                        ThresholdKind::Maximum => "<=",
                    },
                    threshold: decimal(v.threshold),
                    actual: decimal(v.actual),
                    severity: format!("{:?}", v.severity).to_uppercase(),
                })
                .collect(),
        }
    }
}

struct QuasiIdentifierLine {
    column: String,
    most_frequent: String,
    most_frequent_count: usize,
    least_frequent: String,
    least_frequent_count: usize,
    numeric: String,
}

#[derive(Template)]
#[template(path = "utility_report.txt")]
struct UtilityReportText {
    generated_at: String,
    raw_records: usize,
    anonymized_records: usize,
    suppressed: bool,
    average_ec_size: String,
    classification_metric: String,
    discernability_metric: usize,
    average_reidentification_risk: String,
    class_count: usize,
    class_min: usize,
    class_max: usize,
    class_mean: String,
    class_median: String,
    quasi_identifiers: Vec<QuasiIdentifierLine>,
}

impl From<&UtilityReport> for UtilityReportText {
    fn from(report: &UtilityReport) -> Self {
        Self {
            generated_at: report.generated_at.to_rfc3339(),
            raw_records: report.raw_records,
            anonymized_records: report.anonymized_records,
            suppressed: report.suppressed,
            average_ec_size: decimal(report.average_ec_size),
            classification_metric: decimal(report.classification_metric),
            discernability_metric: report.discernability_metric,
            average_reidentification_risk: decimal(report.average_reidentification_risk),
            class_count: report.class_sizes.count,
            class_min: report.class_sizes.min,
            class_max: report.class_sizes.max,
            class_mean: decimal(report.class_sizes.mean),
            class_median: decimal(report.class_sizes.median),
            quasi_identifiers: report
                .quasi_identifiers
                .iter()
                .map(|qi| QuasiIdentifierLine {
                    column: qi.column.clone(),
                    most_frequent: qi.most_frequent.to_string(),
                    most_frequent_count: qi.most_frequent_count,
                    least_frequent: qi.least_frequent.to_string(),
                    least_frequent_count: qi.least_frequent_count,
                    numeric: qi.numeric.as_ref().map_or_else(String::new, |n| {
                        format!(
                            "; mean {}, median {}, std {}, var {}",
                            decimal(n.mean),
                            decimal(n.median),
                            decimal(n.std_dev),
                            decimal(n.variance)
                        )
                    }),
                })
                .collect(),
        }
    }
}

/// Renders a privacy report as human-readable text.
pub fn render_text(report: &PrivacyReport) -> Result<String> {
    Ok(PrivacyReportText::from(report).render()?)
}

/// Renders a privacy report as pretty-printed, schema-validated JSON.
///
/// A recursive `c` that is not applicable is written as `null`.
pub fn render_json(report: &PrivacyReport) -> Result<String> {
    to_validated_json(ReportKind::Privacy, report)
}

/// Renders a utility report as human-readable text.
pub fn render_utility_text(report: &UtilityReport) -> Result<String> {
    Ok(UtilityReportText::from(report).render()?)
}

/// Renders a utility report as pretty-printed, schema-validated JSON.
pub fn render_utility_json(report: &UtilityReport) -> Result<String> {
    to_validated_json(ReportKind::Utility, report)
}

fn to_validated_json<T: serde::Serialize>(kind: ReportKind, report: &T) -> Result<String> {
    let document = serde_json::to_value(report)
        .map_err(|e| AnonScopeError::serialization("serializing report", e))?;
    validate_report(kind, &document)?;
    serde_json::to_string_pretty(&document)
        .map_err(|e| AnonScopeError::serialization("formatting report", e))
}
