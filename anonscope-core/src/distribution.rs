//! Sensitive-attribute value distributions.
//!
//! The comparator tracks every distinct value of one sensitive attribute in
//! the whole table, in ascending [`Value`] order, together with its global
//! relative frequency `p[v]`. Local class distributions `q_ec[v]` are
//! aligned to that global value set, so values absent from a class are
//! still present with frequency zero.

use std::collections::HashMap;

use crate::models::{Table, Value};
use crate::partition::EquivalenceClass;

/// Global distribution of one sensitive attribute, used to compare classes.
#[derive(Debug, Clone)]
pub struct DistributionComparator<'t> {
    table: &'t Table,
    column: usize,
    values: Vec<&'t Value>,
    slots: HashMap<&'t Value, usize>,
    global: Vec<f64>,
}

impl<'t> DistributionComparator<'t> {
    /// Builds the global distribution of the column at `column`.
    pub fn new(table: &'t Table, column: usize) -> Self {
        let mut counts: HashMap<&'t Value, usize> = HashMap::new();
        for value in table.column_values(column) {
            *counts.entry(value).or_insert(0) += 1;
        }

        let mut values: Vec<&'t Value> = counts.keys().copied().collect();
        values.sort();

        let total = table.len() as f64;
        let global = values
            .iter()
            .map(|value| counts.get(value).copied().unwrap_or(0) as f64 / total)
            .collect();
        let slots = values
            .iter()
            .enumerate()
            .map(|(slot, value)| (*value, slot))
            .collect();

        Self {
            table,
            column,
            values,
            slots,
            global,
        }
    }

    /// Distinct values in ascending order.
    pub fn values(&self) -> &[&'t Value] {
        &self.values
    }

    /// Number of distinct values `m`.
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Global frequencies `p[v]`, aligned with [`values`](Self::values).
    pub fn global(&self) -> &[f64] {
        &self.global
    }

    /// Absolute counts of each global value within a class.
    pub fn counts(&self, class: &EquivalenceClass) -> Vec<usize> {
        let mut counts = vec![0usize; self.values.len()];
        for &index in class.indices() {
            if let Some(slot) = self
                .table
                .value(index, self.column)
                .and_then(|value| self.slots.get(value))
            {
                counts[*slot] += 1;
            }
        }
        counts
    }

    /// Local frequencies `q_ec[v]`, aligned with [`values`](Self::values).
    pub fn local(&self, class: &EquivalenceClass) -> Vec<f64> {
        let size = class.len() as f64;
        self.counts(class)
            .into_iter()
            .map(|count| count as f64 / size)
            .collect()
    }
}

/// Counts of the distinct values of a column within a class, in ascending
/// value order. Values that do not occur in the class are omitted.
pub fn class_value_counts(table: &Table, column: usize, class: &EquivalenceClass) -> Vec<usize> {
    let mut counts: HashMap<&Value, usize> = HashMap::new();
    for &index in class.indices() {
        if let Some(value) = table.value(index, column) {
            *counts.entry(value).or_insert(0) += 1;
        }
    }
    let mut entries: Vec<(&Value, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries.into_iter().map(|(_, count)| count).collect()
}

/// Number of distinct values of a column within a class.
pub fn distinct_values(table: &Table, column: usize, class: &EquivalenceClass) -> usize {
    class_value_counts(table, column, class).len()
}
