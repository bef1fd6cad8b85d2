//! Basic and enhanced β-likeness.

use crate::distribution::DistributionComparator;
use crate::error::{AnonScopeError, Result};
use crate::models::Table;
use crate::scope::{AttributeMode, AttributeScope};

use super::max_f64;

/// Largest relative increase `(q - p) / p` of one class over the global
/// distribution.
fn class_distance(global: &[f64], local: &[f64]) -> Option<f64> {
    max_f64(
        global
            .iter()
            .zip(local)
            .filter(|(p, _)| **p > 0.0)
            .map(|(p, q)| (q - p) / p),
    )
}

/// Per-attribute likeness: `(max class distance, enhanced value)`.
fn attribute_likeness(scope: &AttributeScope<'_>) -> Vec<(f64, f64)> {
    let table = scope.table();
    let mut results = Vec::new();

    for view in scope.views() {
        for attribute in view.attributes() {
            let comparator = DistributionComparator::new(table, attribute.position);
            let Some(distance) = max_f64(
                view.partition()
                    .classes()
                    .iter()
                    .filter_map(|class| class_distance(comparator.global(), &comparator.local(class))),
            ) else {
                continue;
            };

            let enhanced = max_f64(
                comparator
                    .global()
                    .iter()
                    .map(|p| distance.min(-p.ln())),
            )
            .unwrap_or(distance);

            tracing::trace!(
                "beta-likeness for '{}': basic {}, enhanced {}",
                attribute.name,
                distance,
                enhanced
            );
            results.push((distance, enhanced));
        }
    }

    results
}

/// Calculates β for basic β-likeness.
///
/// For each class, the distance is the largest relative increase of a
/// sensitive value's local frequency over its global frequency. β is the
/// largest distance over classes and attributes.
pub fn basic_beta_likeness<Q, S>(
    table: &Table,
    quasi_identifiers: &[Q],
    sensitive: &[S],
    mode: AttributeMode,
) -> Result<f64>
where
    Q: AsRef<str>,
    S: AsRef<str>,
{
    basic_beta_likeness_in(&AttributeScope::build(
        table,
        quasi_identifiers,
        sensitive,
        mode,
    )?)
}

/// Basic β-likeness over a prebuilt scope.
pub fn basic_beta_likeness_in(scope: &AttributeScope<'_>) -> Result<f64> {
    scope.ensure_records()?;
    let beta = max_f64(attribute_likeness(scope).into_iter().map(|(basic, _)| basic))
        .ok_or(AnonScopeError::EmptyTable)?;
    tracing::debug!("basic beta-likeness: beta = {}", beta);
    Ok(beta)
}

/// Calculates β for enhanced β-likeness.
///
/// Per attribute, the basic distance is capped by `-ln(p[v])` for each
/// global value and the largest capped value is kept. β is the largest
/// result over attributes, so it never exceeds the basic β.
pub fn enhanced_beta_likeness<Q, S>(
    table: &Table,
    quasi_identifiers: &[Q],
    sensitive: &[S],
    mode: AttributeMode,
) -> Result<f64>
where
    Q: AsRef<str>,
    S: AsRef<str>,
{
    enhanced_beta_likeness_in(&AttributeScope::build(
        table,
        quasi_identifiers,
        sensitive,
        mode,
    )?)
}

/// Enhanced β-likeness over a prebuilt scope.
pub fn enhanced_beta_likeness_in(scope: &AttributeScope<'_>) -> Result<f64> {
    scope.ensure_records()?;
    let beta = max_f64(
        attribute_likeness(scope)
            .into_iter()
            .map(|(_, enhanced)| enhanced),
    )
    .ok_or(AnonScopeError::EmptyTable)?;
    tracing::debug!("enhanced beta-likeness: beta = {}", beta);
    Ok(beta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures::patients;
    use crate::models::Value;

    const QI: [&str; 2] = ["age", "zip"];

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-9
    }

    #[test]
    fn test_basic_beta_categorical() {
        let beta =
            basic_beta_likeness(&patients(), &QI, &["disease"], AttributeMode::Generalized)
                .unwrap();
        assert!(close(beta, 2.0 / 3.0), "beta = {beta}");
    }

    #[test]
    fn test_basic_beta_numeric() {
        let beta =
            basic_beta_likeness(&patients(), &QI, &["salary"], AttributeMode::Generalized)
                .unwrap();
        assert!(close(beta, 7.0 / 3.0), "beta = {beta}");
    }

    #[test]
    fn test_enhanced_beta_capped_by_log_frequency() {
        let table = patients();

        let disease =
            enhanced_beta_likeness(&table, &QI, &["disease"], AttributeMode::Generalized)
                .unwrap();
        assert!(close(disease, 2.0 / 3.0));

        // salary 9 is 1 of 10 records: the cap is -ln(0.1)
        let salary =
            enhanced_beta_likeness(&table, &QI, &["salary"], AttributeMode::Generalized)
                .unwrap();
        assert!(close(salary, 10f64.ln()), "beta = {salary}");
    }

    #[test]
    fn test_enhanced_never_exceeds_basic() {
        let table = patients();
        for mode in [AttributeMode::Generalized, AttributeMode::Independent] {
            let basic = basic_beta_likeness(&table, &QI, &["disease", "salary"], mode).unwrap();
            let enhanced =
                enhanced_beta_likeness(&table, &QI, &["disease", "salary"], mode).unwrap();
            assert!(enhanced <= basic + 1e-12);
        }
    }

    #[test]
    fn test_beta_independent_mode() {
        let table = patients();
        let basic = basic_beta_likeness(
            &table,
            &QI,
            &["disease", "salary"],
            AttributeMode::Independent,
        )
        .unwrap();
        let enhanced = enhanced_beta_likeness(
            &table,
            &QI,
            &["disease", "salary"],
            AttributeMode::Independent,
        )
        .unwrap();

        assert!(close(basic, 9.0), "basic = {basic}");
        assert!(close(enhanced, 10f64.ln()), "enhanced = {enhanced}");
    }

    #[test]
    fn test_beta_zero_when_classes_match_table() {
        let table = Table::new(
            vec!["zip".to_string(), "disease".to_string()],
            vec![
                vec![Value::from("1"), Value::from("a")],
                vec![Value::from("1"), Value::from("b")],
                vec![Value::from("2"), Value::from("a")],
                vec![Value::from("2"), Value::from("b")],
            ],
        )
        .unwrap();

        let beta =
            basic_beta_likeness(&table, &["zip"], &["disease"], AttributeMode::Generalized)
                .unwrap();
        assert!(close(beta, 0.0));
    }

    #[test]
    fn test_beta_empty_table() {
        let table = Table::empty(vec!["zip".to_string(), "disease".to_string()]).unwrap();
        assert!(matches!(
            basic_beta_likeness(&table, &["zip"], &["disease"], AttributeMode::Generalized),
            Err(AnonScopeError::EmptyTable)
        ));
    }
}
