//! Suppression of equivalence classes that fail l-diversity.

use crate::distribution::distinct_values;
use crate::error::Result;
use crate::models::Table;
use crate::partition::partition_by_positions;
use crate::validation::{require_sensitive_attributes, resolve_columns, validate_columns};

/// Removes every equivalence class whose l-diversity is below `l_new`.
///
/// Classes come from the quasi-identifiers alone and a class's `l_EC` is
/// its smallest distinct-value count across the sensitive attributes.
/// Surviving records keep their relative order and are renumbered from 0.
/// An empty result is returned as an empty table, not an error.
///
/// # Errors
/// - `ColumnNotFound` for unknown columns
/// - `EmptySelection` if no sensitive attribute was given
pub fn achieve_l_diversity<Q, S>(
    table: &Table,
    quasi_identifiers: &[Q],
    sensitive: &[S],
    l_new: usize,
) -> Result<Table>
where
    Q: AsRef<str>,
    S: AsRef<str>,
{
    validate_columns(table, quasi_identifiers, sensitive)?;
    require_sensitive_attributes(sensitive)?;

    let qi_positions = resolve_columns(table, quasi_identifiers)?;
    let sa_positions = resolve_columns(table, sensitive)?;
    let partition = partition_by_positions(table, &qi_positions);

    let mut kept: Vec<usize> = Vec::with_capacity(table.len());
    let mut suppressed_classes = 0usize;
    for class in partition.classes() {
        let l_ec = sa_positions
            .iter()
            .map(|&position| distinct_values(table, position, class))
            .min()
            .unwrap_or(0);
        if l_ec >= l_new {
            kept.extend_from_slice(class.indices());
        } else {
            suppressed_classes += 1;
        }
    }
    kept.sort_unstable();

    let result = table.select_rows(&kept);
    tracing::debug!(
        "Suppressed {} of {} classes for l = {}: {} of {} records kept",
        suppressed_classes,
        partition.len(),
        l_new,
        result.len(),
        table.len()
    );
    if result.is_empty() && !table.is_empty() {
        tracing::warn!("Suppression for l = {} removed every record", l_new);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnonScopeError;
    use crate::metrics::fixtures::patients;
    use crate::metrics::l_diversity;
    use crate::models::Value;
    use crate::scope::AttributeMode;

    const QI: [&str; 2] = ["age", "zip"];

    fn skewed() -> Table {
        Table::new(
            vec!["zip".to_string(), "disease".to_string()],
            vec![
                vec![Value::from("1"), Value::from("flu")],
                vec![Value::from("2"), Value::from("flu")],
                vec![Value::from("1"), Value::from("cold")],
                vec![Value::from("2"), Value::from("flu")],
                vec![Value::from("3"), Value::from("cancer")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_suppression_removes_weak_classes() {
        let table = skewed();
        let result = achieve_l_diversity(&table, &["zip"], &["disease"], 2).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.rows()[0], table.rows()[0]);
        assert_eq!(result.rows()[1], table.rows()[2]);
        assert_eq!(
            l_diversity(&result, &["zip"], &["disease"], AttributeMode::Generalized).unwrap(),
            2
        );
    }

    #[test]
    fn test_suppression_keeps_already_diverse_table() {
        let table = patients();
        let result = achieve_l_diversity(&table, &QI, &["disease"], 2).unwrap();
        assert_eq!(result, table);
    }

    #[test]
    fn test_suppression_is_idempotent() {
        let table = skewed();
        let once = achieve_l_diversity(&table, &["zip"], &["disease"], 2).unwrap();
        let twice = achieve_l_diversity(&once, &["zip"], &["disease"], 2).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_suppression_can_empty_table() {
        let table = patients();
        let result = achieve_l_diversity(&table, &QI, &["disease"], 4).unwrap();

        assert!(result.is_empty());
        assert_eq!(result.columns(), table.columns());
    }

    #[test]
    fn test_suppression_uses_worst_attribute() {
        let table = patients();
        // every class has three salaries but disease class B only has two values
        let result = achieve_l_diversity(&table, &QI, &["disease", "salary"], 3).unwrap();
        assert_eq!(result.len(), 7);
    }

    #[test]
    fn test_suppression_validates_columns() {
        let table = patients();
        assert!(matches!(
            achieve_l_diversity(&table, &["height"], &["disease"], 2),
            Err(AnonScopeError::ColumnNotFound { .. })
        ));
        assert!(matches!(
            achieve_l_diversity::<_, &str>(&table, &QI, &[], 2),
            Err(AnonScopeError::EmptySelection { .. })
        ));
    }
}
