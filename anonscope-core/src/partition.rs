//! Equivalence class partitioning.
//!
//! Records are grouped by the tuple of their quasi-identifier values. Each
//! distinct tuple yields one equivalence class; classes are disjoint,
//! non-empty, and together cover every record of the table.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::Result;
use crate::models::{Table, Value};
use crate::validation::resolve_columns;

/// A maximal set of records sharing identical quasi-identifier values.
///
/// Indices are stored in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquivalenceClass {
    indices: Vec<usize>,
}

impl EquivalenceClass {
    /// Record indices in ascending order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of records in the class.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Always false for classes produced by the partitioner.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// The equivalence classes of a table under one quasi-identifier set.
///
/// Class enumeration order is not part of the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partition {
    classes: Vec<EquivalenceClass>,
    row_count: usize,
}

impl Partition {
    /// The equivalence classes.
    pub fn classes(&self) -> &[EquivalenceClass] {
        &self.classes
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// True when the partitioned table had no rows.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Number of records covered by the partition.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Size of the smallest class, or `None` for an empty partition.
    pub fn min_class_size(&self) -> Option<usize> {
        self.classes.iter().map(EquivalenceClass::len).min()
    }

    /// Class sizes in ascending order.
    pub fn sorted_sizes(&self) -> Vec<usize> {
        let mut sizes: Vec<usize> = self.classes.iter().map(EquivalenceClass::len).collect();
        sizes.sort_unstable();
        sizes
    }
}

/// Partitions a table by the named quasi-identifier columns.
///
/// An empty quasi-identifier list places every record in a single class.
///
/// # Errors
/// Returns `ColumnNotFound` naming every unknown column.
pub fn partition<Q: AsRef<str>>(table: &Table, quasi_identifiers: &[Q]) -> Result<Partition> {
    let positions = resolve_columns(table, quasi_identifiers)?;
    Ok(partition_by_positions(table, &positions))
}

/// Partitions a table by column positions that are already known to exist.
pub(crate) fn partition_by_positions(table: &Table, positions: &[usize]) -> Partition {
    let mut slots: HashMap<Vec<&Value>, usize> = HashMap::new();
    let mut classes: Vec<EquivalenceClass> = Vec::new();

    for (index, row) in table.rows().iter().enumerate() {
        let key: Vec<&Value> = positions.iter().filter_map(|&p| row.get(p)).collect();
        match slots.get(&key) {
            Some(&slot) => classes[slot].indices.push(index),
            None => {
                slots.insert(key, classes.len());
                classes.push(EquivalenceClass {
                    indices: vec![index],
                });
            }
        }
    }

    tracing::trace!(
        "Partitioned {} records into {} equivalence classes",
        table.len(),
        classes.len()
    );

    Partition {
        classes,
        row_count: table.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnonScopeError;

    fn table() -> Table {
        Table::new(
            vec!["age".to_string(), "zip".to_string(), "disease".to_string()],
            vec![
                vec![Value::from(30), Value::from("280"), Value::from("flu")],
                vec![Value::from(41), Value::from("280"), Value::from("cold")],
                vec![Value::from(30), Value::from("280"), Value::from("cancer")],
                vec![Value::from(41), Value::from("281"), Value::from("flu")],
                vec![Value::from(30), Value::from("280"), Value::from("flu")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_partition_groups_identical_tuples() {
        let partition = partition(&table(), &["age", "zip"]).unwrap();

        assert_eq!(partition.len(), 3);
        assert_eq!(partition.sorted_sizes(), vec![1, 1, 3]);
        assert_eq!(partition.row_count(), 5);
        assert_eq!(partition.min_class_size(), Some(1));
    }

    #[test]
    fn test_partition_indices_ascending() {
        let partition = partition(&table(), &["age", "zip"]).unwrap();
        let largest = partition
            .classes()
            .iter()
            .find(|class| class.len() == 3)
            .unwrap();

        assert_eq!(largest.indices(), &[0, 2, 4]);
    }

    #[test]
    fn test_partition_independent_of_column_order() {
        let forward = partition(&table(), &["age", "zip"]).unwrap();
        let reverse = partition(&table(), &["zip", "age"]).unwrap();

        let mut forward_classes: Vec<_> = forward.classes().to_vec();
        let mut reverse_classes: Vec<_> = reverse.classes().to_vec();
        forward_classes.sort_by_key(|class| class.indices().to_vec());
        reverse_classes.sort_by_key(|class| class.indices().to_vec());

        assert_eq!(forward_classes, reverse_classes);
    }

    #[test]
    fn test_partition_covers_every_record_once() {
        let partition = partition(&table(), &["zip"]).unwrap();
        let mut seen: Vec<usize> = partition
            .classes()
            .iter()
            .flat_map(|class| class.indices().iter().copied())
            .collect();
        seen.sort_unstable();

        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_partition_without_quasi_identifiers() {
        let partition = partition::<&str>(&table(), &[]).unwrap();

        assert_eq!(partition.len(), 1);
        assert_eq!(partition.classes()[0].len(), 5);
    }

    #[test]
    fn test_partition_empty_table() {
        let empty = Table::empty(vec!["age".to_string()]).unwrap();
        let partition = partition(&empty, &["age"]).unwrap();

        assert!(partition.is_empty());
        assert_eq!(partition.min_class_size(), None);
    }

    #[test]
    fn test_partition_nulls_form_their_own_group() {
        let table = Table::new(
            vec!["age".to_string()],
            vec![vec![Value::Null], vec![Value::from(3)], vec![Value::Null]],
        )
        .unwrap();

        assert_eq!(partition(&table, &["age"]).unwrap().sorted_sizes(), vec![1, 2]);
    }

    #[test]
    fn test_partition_unknown_column() {
        let result = partition(&table(), &["age", "height"]);
        assert!(matches!(result, Err(AnonScopeError::ColumnNotFound { .. })));
    }
}
