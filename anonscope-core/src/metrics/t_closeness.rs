//! t-closeness.
//!
//! The distance between a class distribution and the global one is the
//! Earth Mover's Distance: ordered distance for numeric attributes and
//! equal distance for everything else. A column whose cells are typed
//! partly as numbers and partly as text (diagnosis codes such as `250` and
//! `V45`) has no meaningful order and is measured as categorical.

use crate::distribution::DistributionComparator;
use crate::error::{AnonScopeError, Result};
use crate::models::{ColumnKind, Table};
use crate::scope::{AttributeMode, AttributeScope};

use super::max_f64;

/// Ordered EMD: `Σ_i |Σ_{j<=i} (q[j] - p[j])| / (m - 1)`.
///
/// A single distinct value gives distance zero.
fn ordered_distance(global: &[f64], local: &[f64]) -> f64 {
    let m = global.len();
    if m <= 1 {
        return 0.0;
    }

    let mut cumulative = 0.0;
    let mut total = 0.0;
    for (p, q) in global.iter().zip(local) {
        cumulative += q - p;
        total += f64::abs(cumulative);
    }
    total / (m - 1) as f64
}

/// Equal EMD: half the total variation distance.
fn equal_distance(global: &[f64], local: &[f64]) -> f64 {
    0.5 * global
        .iter()
        .zip(local)
        .map(|(p, q)| (q - p).abs())
        .sum::<f64>()
}

/// Calculates t for t-closeness.
///
/// # Errors
/// Returns `UnsupportedAttributeType` when a sensitive attribute holds only
/// nulls.
pub fn t_closeness<Q, S>(
    table: &Table,
    quasi_identifiers: &[Q],
    sensitive: &[S],
    mode: AttributeMode,
) -> Result<f64>
where
    Q: AsRef<str>,
    S: AsRef<str>,
{
    t_closeness_in(&AttributeScope::build(
        table,
        quasi_identifiers,
        sensitive,
        mode,
    )?)
}

/// t-closeness over a prebuilt scope.
pub fn t_closeness_in(scope: &AttributeScope<'_>) -> Result<f64> {
    scope.ensure_records()?;
    let table = scope.table();

    let mut distances = Vec::new();
    for view in scope.views() {
        for attribute in view.attributes() {
            let kind = table.column_kind(attribute.position);
            let distance: fn(&[f64], &[f64]) -> f64 = match kind {
                ColumnKind::Numeric => ordered_distance,
                ColumnKind::Categorical | ColumnKind::Mixed => equal_distance,
                ColumnKind::Empty => {
                    return Err(AnonScopeError::UnsupportedAttributeType {
                        column: attribute.name.clone(),
                        kind,
                    });
                }
            };

            let comparator = DistributionComparator::new(table, attribute.position);
            distances.extend(
                view.partition()
                    .classes()
                    .iter()
                    .map(|class| distance(comparator.global(), &comparator.local(class))),
            );
        }
    }

    let t = max_f64(distances).ok_or(AnonScopeError::EmptyTable)?;
    tracing::debug!("t-closeness: t = {}", t);
    Ok(t)
}
