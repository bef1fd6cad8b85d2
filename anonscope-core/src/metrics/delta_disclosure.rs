//! δ-disclosure privacy.

use crate::distribution::DistributionComparator;
use crate::error::{AnonScopeError, Result};
use crate::models::Table;
use crate::scope::{AttributeMode, AttributeScope};

use super::max_f64;

/// Calculates δ for δ-disclosure privacy.
///
/// For each class, δ_EC is the largest `|ln(q[v] / p[v])|` over the values
/// that occur in the class. Values absent from a class are skipped since
/// their log ratio is unbounded. δ is the largest δ_EC.
pub fn delta_disclosure<Q, S>(
    table: &Table,
    quasi_identifiers: &[Q],
    sensitive: &[S],
    mode: AttributeMode,
) -> Result<f64>
where
    Q: AsRef<str>,
    S: AsRef<str>,
{
    delta_disclosure_in(&AttributeScope::build(
        table,
        quasi_identifiers,
        sensitive,
        mode,
    )?)
}

/// δ-disclosure privacy over a prebuilt scope.
pub fn delta_disclosure_in(scope: &AttributeScope<'_>) -> Result<f64> {
    scope.ensure_records()?;
    let table = scope.table();

    let delta = max_f64(scope.views().iter().flat_map(|view| {
        view.attributes().iter().flat_map(move |attribute| {
            let comparator = DistributionComparator::new(table, attribute.position);
            view.partition()
                .classes()
                .iter()
                .filter_map(|class| {
                    let local = comparator.local(class);
                    max_f64(
                        comparator
                            .global()
                            .iter()
                            .zip(&local)
                            .map(|(p, q)| q / p)
                            .filter(|ratio| *ratio > 0.0)
                            .map(|ratio| ratio.ln().abs()),
                    )
                })
                .collect::<Vec<f64>>()
        })
    }))
    .ok_or(AnonScopeError::EmptyTable)?;

    tracing::debug!("delta-disclosure privacy: delta = {}", delta);
    Ok(delta)
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
    fn test_delta_categorical() {
        let delta =
            delta_disclosure(&patients(), &QI, &["disease"], AttributeMode::Generalized).unwrap();
        // class B: cold at 2/3 against 0.4 globally, flu at 1/3 against 0.4
        assert!(close(delta, (5.0f64 / 3.0).ln()), "delta = {delta}");
    }

    #[test]
    fn test_delta_numeric() {
        let delta =
            delta_disclosure(&patients(), &QI, &["salary"], AttributeMode::Generalized).unwrap();
        assert!(close(delta, (10.0f64 / 3.0).ln()), "delta = {delta}");
    }

    #[test]
    fn test_delta_generalized_takes_worst_attribute() {
        let table = patients();
        let both = delta_disclosure(
            &table,
            &QI,
            &["disease", "salary"],
            AttributeMode::Generalized,
        )
        .unwrap();
        let salary =
            delta_disclosure(&table, &QI, &["salary"], AttributeMode::Generalized).unwrap();
        assert!(close(both, salary));
    }

    #[test]
    fn test_delta_independent_mode() {
        let delta = delta_disclosure(
            &patients(),
            &QI,
            &["disease", "salary"],
            AttributeMode::Independent,
        )
        .unwrap();
        assert!(close(delta, 10f64.ln()), "delta = {delta}");
    }

    #[test]
    fn test_delta_zero_for_single_class() {
        let table = Table::new(
            vec!["zip".to_string(), "disease".to_string()],
            vec![
                vec![Value::from("1"), Value::from("a")],
                vec![Value::from("1"), Value::from("b")],
            ],
        )
        .unwrap();

        let delta =
            delta_disclosure(&table, &["zip"], &["disease"], AttributeMode::Generalized).unwrap();
        assert!(close(delta, 0.0));
    }
}
