//! Privacy analyzer facade.
//!
//! Computes every privacy metric over one shared [`AttributeScope`] and
//! checks the results against the configured thresholds.

use chrono::Utc;

use crate::Result;
use crate::metrics::{
    alpha_k_anonymity_in, basic_beta_likeness_in, delta_disclosure_in, enhanced_beta_likeness_in,
    entropy_l_diversity_in, k_anonymity_of, l_diversity_in, recursive_c_l_diversity_in,
    t_closeness_in,
};
use crate::models::Table;
use crate::scope::AttributeScope;
use crate::utility::{
    average_ec_size, average_reidentification_risk, class_size_stats, classification_metric,
    discernability_metric, quasi_identifier_stats,
};

use super::config::{AnalysisConfig, PrivacyThresholds};
use super::models::{
    DataSummary, PrivacyReport, REPORT_FORMAT_VERSION, ThresholdViolation, UtilityReport,
};

/// Privacy analyzer producing [`PrivacyReport`]s.
///
/// # Example
///
/// ```rust
/// use anonscope_core::models::{Table, Value};
/// use anonscope_core::report::{AnalysisConfig, PrivacyAnalyzer};
///
/// let table = Table::new(
///     vec!["zip".to_string(), "disease".to_string()],
///     vec![
///         vec![Value::from("280"), Value::from("flu")],
///         vec![Value::from("280"), Value::from("cold")],
///     ],
/// )?;
///
/// let analyzer = PrivacyAnalyzer::new(AnalysisConfig::new().with_min_k(2));
/// let report = analyzer.analyze(&table, &["zip"], &["disease"])?;
/// assert_eq!(report.k_anonymity, 2);
/// assert!(report.passed());
/// # Ok::<(), anonscope_core::AnonScopeError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PrivacyAnalyzer {
    config: AnalysisConfig,
}

impl PrivacyAnalyzer {
    /// Creates a new analyzer with the given configuration.
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Creates an analyzer in generalized mode with no thresholds.
    pub fn with_defaults() -> Self {
        Self::new(AnalysisConfig::default())
    }

    /// Returns a reference to the analyzer configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Computes all nine metrics and checks the thresholds.
    ///
    /// The table is partitioned once; every metric reads the same scope.
    ///
    /// # Errors
    /// Fails on the first metric error: unknown columns, no sensitive
    /// attributes, an empty table or a t-closeness attribute that is
    /// neither numeric nor categorical.
    pub fn analyze<Q, S>(
        &self,
        table: &Table,
        quasi_identifiers: &[Q],
        sensitive: &[S],
    ) -> Result<PrivacyReport>
    where
        Q: AsRef<str>,
        S: AsRef<str>,
    {
        let scope = AttributeScope::build(table, quasi_identifiers, sensitive, self.config.mode)?;
        let qi_partition = scope.quasi_identifier_partition();

        tracing::info!(
            "Analyzing {} records ({} classes) in {} mode",
            table.len(),
            qi_partition.len(),
            self.config.mode
        );

        let k_anonymity = k_anonymity_of(&qi_partition)?;
        let alpha_k_anonymity = alpha_k_anonymity_in(&scope)?;
        let l_diversity = l_diversity_in(&scope)?;
        let entropy_l_diversity = entropy_l_diversity_in(&scope)?;
        let recursive_c_l_diversity = recursive_c_l_diversity_in(&scope)?;
        let basic_beta_likeness = basic_beta_likeness_in(&scope)?;
        let enhanced_beta_likeness = enhanced_beta_likeness_in(&scope)?;
        let delta_disclosure = delta_disclosure_in(&scope)?;
        let t_closeness = t_closeness_in(&scope)?;

        let mut report = PrivacyReport {
            format_version: REPORT_FORMAT_VERSION.to_string(),
            generated_at: Utc::now(),
            data: DataSummary {
                source: None,
                quasi_identifiers: names(quasi_identifiers),
                sensitive_attributes: names(sensitive),
                mode: self.config.mode,
                record_count: table.len(),
                class_count: qi_partition.len(),
            },
            k_anonymity,
            alpha_k_anonymity,
            l_diversity,
            entropy_l_diversity,
            recursive_c_l_diversity,
            basic_beta_likeness,
            enhanced_beta_likeness,
            delta_disclosure,
            t_closeness,
            threshold_violations: Vec::new(),
        };
        report.threshold_violations = check_thresholds(&self.config.thresholds, &report);

        for violation in &report.threshold_violations {
            tracing::warn!(
                "Privacy threshold violated: {} = {} ({:?} {})",
                violation.metric,
                violation.actual,
                violation.kind,
                violation.threshold
            );
        }

        Ok(report)
    }
}

fn names<C: AsRef<str>>(columns: &[C]) -> Vec<String> {
    columns.iter().map(|c| c.as_ref().to_string()).collect()
}

fn check_thresholds(thresholds: &PrivacyThresholds, report: &PrivacyReport) -> Vec<ThresholdViolation> {
    let mut violations = Vec::new();

    let minimums = [
        ("k_anonymity", thresholds.min_k, report.k_anonymity),
        ("l_diversity", thresholds.min_l, report.l_diversity),
        (
            "entropy_l_diversity",
            thresholds.min_entropy_l,
            report.entropy_l_diversity,
        ),
    ];
    for (metric, threshold, actual) in minimums {
        if let Some(threshold) = threshold
            && actual < threshold
        {
            violations.push(ThresholdViolation::below_minimum(
                metric,
                threshold as f64,
                actual as f64,
            ));
        }
    }

    match (thresholds.max_c, report.recursive_c_l_diversity.c) {
        (Some(threshold), Some(c)) if c > threshold => {
            violations.push(ThresholdViolation::above_maximum(
                "recursive_c_l_diversity",
                threshold as f64,
                c as f64,
            ));
        }
        (Some(_), None) => {
            tracing::debug!("max_c not checked: recursive c is not applicable");
        }
        _ => {}
    }

    let maximums = [
        (
            "alpha_k_anonymity",
            thresholds.max_alpha,
            report.alpha_k_anonymity.alpha,
        ),
        (
            "basic_beta_likeness",
            thresholds.max_basic_beta,
            report.basic_beta_likeness,
        ),
        (
            "enhanced_beta_likeness",
            thresholds.max_enhanced_beta,
            report.enhanced_beta_likeness,
        ),
        ("delta_disclosure", thresholds.max_delta, report.delta_disclosure),
        ("t_closeness", thresholds.max_t, report.t_closeness),
    ];
    for (metric, threshold, actual) in maximums {
        if let Some(threshold) = threshold
            && actual > threshold
        {
            violations.push(ThresholdViolation::above_maximum(metric, threshold, actual));
        }
    }

    violations
}

impl PrivacyReport {
    /// Sets the data source description.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.data.source = Some(source.into());
        self
    }
}

/// Computes every utility metric for an anonymized table.
///
/// `suppressed` states whether anonymization removed records; it selects
/// the table size used by the average class size.
pub fn analyze_utility<Q, S>(
    raw: &Table,
    anonymized: &Table,
    quasi_identifiers: &[Q],
    sensitive: &[S],
    suppressed: bool,
) -> Result<UtilityReport>
where
    Q: AsRef<str>,
    S: AsRef<str>,
{
    tracing::info!(
        "Measuring utility of {} anonymized records against {} raw records",
        anonymized.len(),
        raw.len()
    );

    let quasi_identifier_details = quasi_identifiers
        .iter()
        .map(|column| quasi_identifier_stats(anonymized, column.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    Ok(UtilityReport {
        format_version: REPORT_FORMAT_VERSION.to_string(),
        generated_at: Utc::now(),
        raw_records: raw.len(),
        anonymized_records: anonymized.len(),
        suppressed,
        average_ec_size: average_ec_size(raw, anonymized, quasi_identifiers, suppressed)?,
        classification_metric: classification_metric(
            raw,
            anonymized,
            quasi_identifiers,
            sensitive,
        )?,
        discernability_metric: discernability_metric(raw, anonymized, quasi_identifiers)?,
        average_reidentification_risk: average_reidentification_risk(
            anonymized,
            quasi_identifiers,
        )?,
        class_sizes: class_size_stats(anonymized, quasi_identifiers)?,
        quasi_identifiers: quasi_identifier_details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnonScopeError;
    use crate::metrics::fixtures::patients;
    use crate::metrics::{k_anonymity, t_closeness};
    use crate::report::models::{ThresholdKind, ViolationSeverity};
    use crate::scope::AttributeMode;
    use crate::suppression::achieve_l_diversity;

    const QI: [&str; 2] = ["age", "zip"];

    #[test]
    fn test_analyze_all_metrics() {
        let report = PrivacyAnalyzer::with_defaults()
            .analyze(&patients(), &QI, &["disease"])
            .unwrap();

        assert_eq!(report.format_version, "1.0");
        assert_eq!(report.data.record_count, 10);
        assert_eq!(report.data.class_count, 3);
        assert_eq!(report.k_anonymity, 3);
        assert_eq!(report.alpha_k_anonymity.k, 3);
        assert_eq!(report.l_diversity, 2);
        assert_eq!(report.entropy_l_diversity, 1);
        assert_eq!(report.recursive_c_l_diversity.c, Some(1));
        assert!((report.t_closeness - 4.0 / 15.0).abs() < 1e-9);
        assert!(report.passed());
    }

    #[test]
    fn test_analyze_matches_standalone_metrics() {
        let table = patients();
        let analyzer =
            PrivacyAnalyzer::new(AnalysisConfig::new().with_mode(AttributeMode::Independent));
        let report = analyzer
            .analyze(&table, &QI, &["disease", "salary"])
            .unwrap();

        assert_eq!(report.k_anonymity, k_anonymity(&table, &QI).unwrap());
        assert_eq!(
            report.t_closeness,
            t_closeness(&table, &QI, &["disease", "salary"], AttributeMode::Independent)
                .unwrap()
        );
        assert_eq!(report.data.mode, AttributeMode::Independent);
        assert_eq!(report.recursive_c_l_diversity.c, None);
    }

    #[test]
    fn test_analyze_reports_violations() {
        let config = AnalysisConfig::new()
            .with_min_k(5)
            .with_min_l(2)
            .with_max_t(0.1)
            .with_max_c(0);
        let report = PrivacyAnalyzer::new(config)
            .analyze(&patients(), &QI, &["disease"])
            .unwrap();

        let metrics: Vec<&str> = report
            .threshold_violations
            .iter()
            .map(|v| v.metric.as_str())
            .collect();
        assert_eq!(
            metrics,
            vec!["k_anonymity", "recursive_c_l_diversity", "t_closeness"]
        );

        let k = &report.threshold_violations[0];
        assert_eq!(k.kind, ThresholdKind::Minimum);
        assert_eq!(k.severity, ViolationSeverity::Critical);
        assert!(!report.passed());
        assert_eq!(report.critical_violations(), 3);
    }

    #[test]
    fn test_analyze_skips_max_c_when_not_applicable() {
        let config = AnalysisConfig::new()
            .with_mode(AttributeMode::Independent)
            .with_max_c(1);
        let report = PrivacyAnalyzer::new(config)
            .analyze(&patients(), &QI, &["disease", "salary"])
            .unwrap();

        assert!(
            report
                .threshold_violations
                .iter()
                .all(|v| v.metric != "recursive_c_l_diversity")
        );
    }

    #[test]
    fn test_analyze_propagates_metric_errors() {
        let table = Table::new(
            vec!["zip".to_string(), "code".to_string()],
            vec![
                vec![crate::models::Value::from("1"), crate::models::Value::Null],
                vec![crate::models::Value::from("1"), crate::models::Value::Null],
            ],
        )
        .unwrap();

        assert!(matches!(
            PrivacyAnalyzer::with_defaults().analyze(&table, &["zip"], &["code"]),
            Err(AnonScopeError::UnsupportedAttributeType { .. })
        ));
    }

    #[test]
    fn test_analyze_mixed_code_column() {
        let table = Table::new(
            vec!["zip".to_string(), "code".to_string()],
            vec![
                vec![crate::models::Value::from("1"), crate::models::Value::from(250)],
                vec![crate::models::Value::from("1"), crate::models::Value::from("V45")],
                vec![crate::models::Value::from("2"), crate::models::Value::from(250)],
                vec![crate::models::Value::from("2"), crate::models::Value::from(401)],
            ],
        )
        .unwrap();

        let report = PrivacyAnalyzer::with_defaults()
            .analyze(&table, &["zip"], &["code"])
            .unwrap();
        assert_eq!(report.l_diversity, 2);
        assert!((report.t_closeness - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_report_with_source() {
        let report = PrivacyAnalyzer::with_defaults()
            .analyze(&patients(), &QI, &["disease"])
            .unwrap()
            .with_source("patients.csv");
        assert_eq!(report.data.source.as_deref(), Some("patients.csv"));
    }

    #[test]
    fn test_analyze_utility() {
        let raw = patients();
        let anonymized = achieve_l_diversity(&raw, &QI, &["disease"], 3).unwrap();
        let report = analyze_utility(&raw, &anonymized, &QI, &["disease"], true).unwrap();

        assert_eq!(report.raw_records, 10);
        assert_eq!(report.anonymized_records, 7);
        assert_eq!(report.discernability_metric, 16 + 9 + 30);
        assert!((report.classification_metric - 0.5).abs() < 1e-12);
        assert_eq!(report.class_sizes.count, 2);
        assert_eq!(report.quasi_identifiers.len(), 2);
        assert_eq!(report.quasi_identifiers[0].column, "age");
    }
}
