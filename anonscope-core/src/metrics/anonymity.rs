//! k-anonymity and (α,k)-anonymity.

use serde::{Deserialize, Serialize};

use crate::distribution::class_value_counts;
use crate::error::{AnonScopeError, Result};
use crate::models::Table;
use crate::partition::{Partition, partition};
use crate::scope::{AttributeMode, AttributeScope};
use crate::validation::validate_quasi_identifiers;

use super::max_f64;

/// Result of (α,k)-anonymity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlphaK {
    /// Largest relative frequency of any sensitive value within any class
    pub alpha: f64,
    /// k-anonymity of the quasi-identifier partition
    pub k: usize,
}

/// Calculates k for k-anonymity: the size of the smallest equivalence class.
///
/// # Errors
/// - `ColumnNotFound` for unknown quasi-identifiers
/// - `EmptyTable` if the table has no records
pub fn k_anonymity<Q: AsRef<str>>(table: &Table, quasi_identifiers: &[Q]) -> Result<usize> {
    validate_quasi_identifiers(table, quasi_identifiers)?;
    let partition = partition(table, quasi_identifiers)?;
    k_anonymity_of(&partition)
}

/// k-anonymity of an already computed partition.
pub fn k_anonymity_of(partition: &Partition) -> Result<usize> {
    let k = partition.min_class_size().ok_or(AnonScopeError::EmptyTable)?;
    tracing::debug!("k-anonymity: k = {} over {} classes", k, partition.len());
    Ok(k)
}

/// Calculates α and k for (α,k)-anonymity.
///
/// α is the maximum, over classes and sensitive attributes, of the relative
/// frequency of the most common sensitive value in the class. k is always
/// computed from the quasi-identifiers alone, whatever the mode.
pub fn alpha_k_anonymity<Q, S>(
    table: &Table,
    quasi_identifiers: &[Q],
    sensitive: &[S],
    mode: AttributeMode,
) -> Result<AlphaK>
where
    Q: AsRef<str>,
    S: AsRef<str>,
{
    alpha_k_anonymity_in(&AttributeScope::build(
        table,
        quasi_identifiers,
        sensitive,
        mode,
    )?)
}

/// (α,k)-anonymity over a prebuilt scope.
pub fn alpha_k_anonymity_in(scope: &AttributeScope<'_>) -> Result<AlphaK> {
    scope.ensure_records()?;
    let table = scope.table();

    let alpha = max_f64(scope.views().iter().flat_map(|view| {
        view.partition().classes().iter().flat_map(move |class| {
            view.attributes().iter().map(move |attribute| {
                let most_common = class_value_counts(table, attribute.position, class)
                    .into_iter()
                    .max()
                    .unwrap_or(0);
                most_common as f64 / class.len() as f64
            })
        })
    }))
    .ok_or(AnonScopeError::EmptyTable)?;

    let k = k_anonymity_of(&scope.quasi_identifier_partition())?;
    tracing::debug!("(alpha,k)-anonymity: alpha = {}, k = {}", alpha, k);

    Ok(AlphaK { alpha, k })
}
