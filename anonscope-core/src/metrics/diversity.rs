//! l-diversity, entropy l-diversity and recursive (c,l)-diversity.

use serde::{Deserialize, Serialize};

use crate::distribution::{class_value_counts, distinct_values};
use crate::error::{AnonScopeError, Result};
use crate::models::Table;
use crate::scope::{AttributeMode, AttributeScope};

use super::max_f64;

/// Slack added before truncating `e^H`, which lands just below an integer
/// for uniform classes (`e^(ln 2) = 1.9999999999999998`).
const ENTROPY_TOLERANCE: f64 = 1e-9;

/// Result of recursive (c,l)-diversity.
///
/// `c` is `None` when `l <= 1`: the recursive condition is then not
/// defined and callers must treat the value as not applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecursiveDiversity {
    /// c, when defined
    pub c: Option<usize>,
    /// l-diversity of the same scope
    pub l: usize,
}

impl RecursiveDiversity {
    /// True when `c` could be computed.
    pub fn is_applicable(&self) -> bool {
        self.c.is_some()
    }
}

/// Calculates l for l-diversity.
///
/// For each class, `l_EC` is the smallest number of distinct values across
/// the sensitive attributes; l is the smallest `l_EC`.
pub fn l_diversity<Q, S>(
    table: &Table,
    quasi_identifiers: &[Q],
    sensitive: &[S],
    mode: AttributeMode,
) -> Result<usize>
where
    Q: AsRef<str>,
    S: AsRef<str>,
{
    l_diversity_in(&AttributeScope::build(
        table,
        quasi_identifiers,
        sensitive,
        mode,
    )?)
}

/// l-diversity over a prebuilt scope.
pub fn l_diversity_in(scope: &AttributeScope<'_>) -> Result<usize> {
    scope.ensure_records()?;
    let table = scope.table();

    let l = scope
        .views()
        .iter()
        .flat_map(|view| {
            view.partition().classes().iter().map(move |class| {
                view.attributes()
                    .iter()
                    .map(|attribute| distinct_values(table, attribute.position, class))
                    .min()
                    .unwrap_or(0)
            })
        })
        .min()
        .ok_or(AnonScopeError::EmptyTable)?;

    tracing::debug!("l-diversity: l = {}", l);
    Ok(l)
}

/// Calculates l for entropy l-diversity.
///
/// The entropy of a class for one attribute is `-Σ q·ln(q)` over the values
/// present in the class. The smallest entropy over classes and attributes
/// is exponentiated and truncated to an integer, so a class with `n`
/// equally frequent values yields exactly `n`.
pub fn entropy_l_diversity<Q, S>(
    table: &Table,
    quasi_identifiers: &[Q],
    sensitive: &[S],
    mode: AttributeMode,
) -> Result<usize>
where
    Q: AsRef<str>,
    S: AsRef<str>,
{
    entropy_l_diversity_in(&AttributeScope::build(
        table,
        quasi_identifiers,
        sensitive,
        mode,
    )?)
}

/// Entropy l-diversity over a prebuilt scope.
pub fn entropy_l_diversity_in(scope: &AttributeScope<'_>) -> Result<usize> {
    scope.ensure_records()?;
    let table = scope.table();

    let min_entropy = scope
        .views()
        .iter()
        .flat_map(|view| {
            view.partition().classes().iter().flat_map(move |class| {
                view.attributes().iter().map(move |attribute| {
                    let size = class.len() as f64;
                    let sum: f64 = class_value_counts(table, attribute.position, class)
                        .into_iter()
                        .map(|count| {
                            let q = count as f64 / size;
                            q * q.ln()
                        })
                        .sum();
                    -sum
                })
            })
        })
        .fold(None, |acc: Option<f64>, entropy| match acc {
            Some(current) if current <= entropy => Some(current),
            _ => Some(entropy),
        })
        .ok_or(AnonScopeError::EmptyTable)?;

    let l = (min_entropy.exp() + ENTROPY_TOLERANCE).floor() as usize;
    tracing::debug!(
        "entropy l-diversity: l = {} (minimum entropy {:.6})",
        l,
        min_entropy
    );
    Ok(l)
}

/// Calculates c and l for recursive (c,l)-diversity.
///
/// l is the l-diversity of the same scope. When `l > 1`, each class's value
/// counts `r` are sorted ascending and `c_EC = ⌊r[0] / Σ r[l-1..] + 1⌋`;
/// c is the largest `c_EC` over classes and attributes.
///
/// In [`AttributeMode::Independent`] l is the independent-mode l-diversity,
/// not the generalized one, so it can be smaller than the l reported for
/// the same attributes in generalized mode. Every class of every view then
/// holds at least l distinct values and the tail `r[l-1..]` is never empty.
pub fn recursive_c_l_diversity<Q, S>(
    table: &Table,
    quasi_identifiers: &[Q],
    sensitive: &[S],
    mode: AttributeMode,
) -> Result<RecursiveDiversity>
where
    Q: AsRef<str>,
    S: AsRef<str>,
{
    recursive_c_l_diversity_in(&AttributeScope::build(
        table,
        quasi_identifiers,
        sensitive,
        mode,
    )?)
}

/// Recursive (c,l)-diversity over a prebuilt scope.
///
/// l is taken from [`l_diversity_in`] on this same scope, so its mode
/// decides both l and the classes c is measured over.
pub fn recursive_c_l_diversity_in(scope: &AttributeScope<'_>) -> Result<RecursiveDiversity> {
    let l = l_diversity_in(scope)?;
    if l <= 1 {
        tracing::debug!("recursive (c,l)-diversity: c not applicable for l = {}", l);
        return Ok(RecursiveDiversity { c: None, l });
    }

    let table = scope.table();
    let tail_start = l - 1;

    let c = max_f64(scope.views().iter().flat_map(|view| {
        view.attributes().iter().flat_map(move |attribute| {
            view.partition().classes().iter().filter_map(move |class| {
                let mut counts = class_value_counts(table, attribute.position, class);
                counts.sort_unstable();
                let tail: usize = counts.get(tail_start..)?.iter().sum();
                let head = *counts.first()?;
                if tail == 0 {
                    return None;
                }
                Some((head as f64 / tail as f64 + 1.0).floor())
            })
        })
    }))
    .map(|c| c as usize);

    tracing::debug!("recursive (c,l)-diversity: c = {:?}, l = {}", c, l);
    Ok(RecursiveDiversity { c, l })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures::patients;
    use crate::models::Value;

    const QI: [&str; 2] = ["age", "zip"];

    #[test]
    fn test_l_diversity_single_attribute() {
        let table = patients();
        assert_eq!(
            l_diversity(&table, &QI, &["disease"], AttributeMode::Generalized).unwrap(),
            2
        );
        assert_eq!(
            l_diversity(&table, &QI, &["salary"], AttributeMode::Generalized).unwrap(),
            3
        );
    }

    #[test]
    fn test_l_diversity_takes_worst_attribute() {
        let table = patients();
        assert_eq!(
            l_diversity(&table, &QI, &["disease", "salary"], AttributeMode::Generalized)
                .unwrap(),
            2
        );
    }

    #[test]
    fn test_l_diversity_independent_mode() {
        let table = patients();
        assert_eq!(
            l_diversity(&table, &QI, &["disease", "salary"], AttributeMode::Independent)
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_l_diversity_bounded_by_smallest_class() {
        let table = patients();
        let l = l_diversity(&table, &["zip"], &["disease"], AttributeMode::Generalized).unwrap();
        assert!(l <= 3);
    }

    #[test]
    fn test_entropy_l_diversity() {
        let table = patients();
        assert_eq!(
            entropy_l_diversity(&table, &QI, &["disease"], AttributeMode::Generalized).unwrap(),
            1
        );
        assert_eq!(
            entropy_l_diversity(&table, &QI, &["salary"], AttributeMode::Generalized).unwrap(),
            2
        );
    }

    /// Two classes, each holding the values `0..n` once.
    fn uniform_table(n: i64) -> Table {
        let rows = ["1", "2"]
            .into_iter()
            .flat_map(|zip| (0..n).map(move |value| vec![Value::from(zip), Value::from(value)]))
            .collect();
        Table::new(vec!["zip".to_string(), "disease".to_string()], rows).unwrap()
    }

    #[test]
    fn test_entropy_l_diversity_uniform_class() {
        // e^(ln n) can land just below n
        for n in [2, 3, 4, 10] {
            let table = uniform_table(n);
            assert_eq!(
                entropy_l_diversity(&table, &["zip"], &["disease"], AttributeMode::Generalized)
                    .unwrap(),
                n as usize,
                "uniform class of {n} values"
            );
        }
    }

    /// One class where `a` splits 3/3 and `b` splits 2/2/2.
    fn two_attribute_table() -> Table {
        let rows = [
            ("x", "p"),
            ("y", "p"),
            ("x", "q"),
            ("y", "q"),
            ("x", "r"),
            ("y", "r"),
        ]
        .into_iter()
        .map(|(a, b)| vec![Value::from("1"), Value::from(a), Value::from(b)])
        .collect();
        Table::new(
            vec!["zip".to_string(), "a".to_string(), "b".to_string()],
            rows,
        )
        .unwrap()
    }

    #[test]
    fn test_entropy_l_diversity_independent_mode() {
        let table = two_attribute_table();

        // a grouped by zip and b: every class is {x, y}, so e^(ln 2) = 2
        // b grouped by zip and a: every class is {p, q, r}, so e^(ln 3) = 3
        assert_eq!(
            entropy_l_diversity(&table, &["zip"], &["a", "b"], AttributeMode::Independent)
                .unwrap(),
            2
        );
        assert_eq!(
            entropy_l_diversity(&table, &["zip"], &["b"], AttributeMode::Independent).unwrap(),
            3
        );

        let patients = patients();
        assert_eq!(
            entropy_l_diversity(
                &patients,
                &QI,
                &["disease", "salary"],
                AttributeMode::Independent
            )
            .unwrap(),
            1
        );
    }

    #[test]
    fn test_recursive_c_l_diversity_generalized_multiple_attributes() {
        let table = two_attribute_table();

        // l = min(2, 3) = 2; a gives ⌊3/3 + 1⌋ = 2, b gives ⌊2/4 + 1⌋ = 1
        let result =
            recursive_c_l_diversity(&table, &["zip"], &["a", "b"], AttributeMode::Generalized)
                .unwrap();
        assert_eq!(result, RecursiveDiversity { c: Some(2), l: 2 });

        let patients = patients();
        let result = recursive_c_l_diversity(
            &patients,
            &QI,
            &["disease", "salary"],
            AttributeMode::Generalized,
        )
        .unwrap();
        assert_eq!(result, RecursiveDiversity { c: Some(1), l: 2 });
    }

    #[test]
    fn test_recursive_c_l_diversity_uses_independent_l() {
        let table = two_attribute_table();

        // independent views hold {x, y} or {p, q, r}, so l = 2; a's views
        // give ⌊1/1 + 1⌋ = 2 and b's give ⌊1/2 + 1⌋ = 1
        let independent =
            recursive_c_l_diversity(&table, &["zip"], &["a", "b"], AttributeMode::Independent)
                .unwrap();
        assert_eq!(
            independent.l,
            l_diversity(&table, &["zip"], &["a", "b"], AttributeMode::Independent).unwrap()
        );
        assert_eq!(independent, RecursiveDiversity { c: Some(2), l: 2 });

        let patients = patients();
        let generalized =
            recursive_c_l_diversity(&patients, &QI, &["disease"], AttributeMode::Generalized)
                .unwrap();
        let independent = recursive_c_l_diversity(
            &patients,
            &QI,
            &["disease", "salary"],
            AttributeMode::Independent,
        )
        .unwrap();
        assert_eq!(generalized.l, 2);
        assert_eq!(independent.l, 1);
    }

    #[test]
    fn test_recursive_c_l_diversity() {
        let table = patients();

        let disease =
            recursive_c_l_diversity(&table, &QI, &["disease"], AttributeMode::Generalized)
                .unwrap();
        assert_eq!(disease, RecursiveDiversity { c: Some(1), l: 2 });

        let salary =
            recursive_c_l_diversity(&table, &QI, &["salary"], AttributeMode::Generalized)
                .unwrap();
        assert_eq!(salary, RecursiveDiversity { c: Some(2), l: 3 });
        assert!(salary.is_applicable());
    }

    #[test]
    fn test_recursive_c_not_applicable_when_l_is_one() {
        let table = patients();
        let result = recursive_c_l_diversity(
            &table,
            &QI,
            &["disease", "salary"],
            AttributeMode::Independent,
        )
        .unwrap();

        assert_eq!(result.l, 1);
        assert_eq!(result.c, None);
        assert!(!result.is_applicable());
    }

    #[test]
    fn test_diversity_empty_table() {
        let table = Table::empty(vec!["zip".to_string(), "disease".to_string()]).unwrap();
        assert!(matches!(
            l_diversity(&table, &["zip"], &["disease"], AttributeMode::Generalized),
            Err(AnonScopeError::EmptyTable)
        ));
        assert!(matches!(
            entropy_l_diversity(&table, &["zip"], &["disease"], AttributeMode::Generalized),
            Err(AnonScopeError::EmptyTable)
        ));
    }
}
