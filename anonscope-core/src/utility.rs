//! Utility metrics for comparing a raw table with its anonymized version.
//!
//! These measure how much information anonymization cost rather than how
//! much it protects. All of them are computed from the anonymized table's
//! quasi-identifier partition.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{AnonScopeError, Result};
use crate::metrics::k_anonymity_of;
use crate::models::{ColumnKind, Table, Value};
use crate::partition::{Partition, partition, partition_by_positions};
use crate::validation::{
    require_sensitive_attributes, resolve_columns, validate_columns, validate_quasi_identifiers,
};

/// Summary of equivalence class sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSizeStats {
    /// Number of classes
    pub count: usize,
    /// Smallest class
    pub min: usize,
    /// Largest class
    pub max: usize,
    /// Mean class size
    pub mean: f64,
    /// Median class size
    pub median: f64,
}

/// Central tendency and spread of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    /// Arithmetic mean
    pub mean: f64,
    /// Median
    pub median: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Population variance
    pub variance: f64,
}

/// Frequency statistics for one quasi-identifier column.
///
/// Ties are broken toward the smallest value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuasiIdentifierStats {
    /// Column name
    pub column: String,
    /// Most frequent value
    pub most_frequent: Value,
    /// Its number of occurrences
    pub most_frequent_count: usize,
    /// Least frequent value
    pub least_frequent: Value,
    /// Its number of occurrences
    pub least_frequent_count: usize,
    /// Present for numeric columns only
    pub numeric: Option<NumericSummary>,
}

fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

fn qi_partition<Q: AsRef<str>>(table: &Table, quasi_identifiers: &[Q]) -> Result<Partition> {
    validate_quasi_identifiers(table, quasi_identifiers)?;
    partition(table, quasi_identifiers)
}

/// Average equivalence class size: `|T| / (#EC · k)`.
///
/// `|T|` is the anonymized size when records were suppressed and the raw
/// size otherwise. A value of 1 means every class has exactly k records.
///
/// # Errors
/// Returns `EmptyTable` if the anonymized table has no records.
pub fn average_ec_size<Q: AsRef<str>>(
    raw: &Table,
    anonymized: &Table,
    quasi_identifiers: &[Q],
    suppressed: bool,
) -> Result<f64> {
    let partition = qi_partition(anonymized, quasi_identifiers)?;
    let k = k_anonymity_of(&partition)?;
    let size = if suppressed { anonymized.len() } else { raw.len() };

    let average = size as f64 / (partition.len() * k) as f64;
    tracing::debug!("average equivalence class size: {}", average);
    Ok(average)
}

/// Classification metric.
///
/// Every suppressed record is a penalty, as is every record whose
/// sensitive-attribute tuple is not the most common one in its class. The
/// total is normalized by the raw size.
pub fn classification_metric<Q, S>(
    raw: &Table,
    anonymized: &Table,
    quasi_identifiers: &[Q],
    sensitive: &[S],
) -> Result<f64>
where
    Q: AsRef<str>,
    S: AsRef<str>,
{
    validate_columns(anonymized, quasi_identifiers, sensitive)?;
    require_sensitive_attributes(sensitive)?;
    if raw.is_empty() {
        return Err(AnonScopeError::EmptyTable);
    }

    let qi_positions = resolve_columns(anonymized, quasi_identifiers)?;
    let sa_positions = resolve_columns(anonymized, sensitive)?;
    let partition = partition_by_positions(anonymized, &qi_positions);

    let mut penalty = raw.len().saturating_sub(anonymized.len());
    for class in partition.classes() {
        let mut counts: HashMap<Vec<&Value>, usize> = HashMap::new();
        for &index in class.indices() {
            let tuple: Vec<&Value> = sa_positions
                .iter()
                .filter_map(|&position| anonymized.value(index, position))
                .collect();
            *counts.entry(tuple).or_insert(0) += 1;
        }
        let majority = counts.values().copied().max().unwrap_or(0);
        penalty += counts.values().filter(|&&count| count != majority).sum::<usize>();
    }

    let metric = penalty as f64 / raw.len() as f64;
    tracing::debug!("classification metric: {}", metric);
    Ok(metric)
}

/// Discernability metric: `Σ |EC|² + (|raw| - |anonymized|) · |raw|`.
///
/// Each suppressed record is charged the size of the raw table.
pub fn discernability_metric<Q: AsRef<str>>(
    raw: &Table,
    anonymized: &Table,
    quasi_identifiers: &[Q],
) -> Result<usize> {
    let partition = qi_partition(anonymized, quasi_identifiers)?;
    let squares: usize = partition.classes().iter().map(|class| class.len().pow(2)).sum();
    let suppressed = raw.len().saturating_sub(anonymized.len());

    let metric = squares + suppressed * raw.len();
    tracing::debug!("discernability metric: {}", metric);
    Ok(metric)
}

/// Count, extremes, mean and median of the equivalence class sizes.
pub fn class_size_stats<Q: AsRef<str>>(table: &Table, quasi_identifiers: &[Q]) -> Result<ClassSizeStats> {
    let partition = qi_partition(table, quasi_identifiers)?;
    let sizes = partition.sorted_sizes();
    let (Some(&min), Some(&max)) = (sizes.first(), sizes.last()) else {
        return Err(AnonScopeError::EmptyTable);
    };

    let as_f64: Vec<f64> = sizes.iter().map(|&size| size as f64).collect();
    Ok(ClassSizeStats {
        count: sizes.len(),
        min,
        max,
        mean: as_f64.iter().sum::<f64>() / as_f64.len() as f64,
        median: median(&as_f64),
    })
}

/// Frequency statistics for one quasi-identifier column.
///
/// Numeric columns also get mean, median and population spread over their
/// non-null values.
pub fn quasi_identifier_stats(table: &Table, column: &str) -> Result<QuasiIdentifierStats> {
    let position = table
        .column_index(column)
        .ok_or_else(|| AnonScopeError::columns_not_found([column]))?;

    let mut counts: HashMap<&Value, usize> = HashMap::new();
    for value in table.column_values(position) {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut entries: Vec<(&Value, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    // strict comparisons keep the first (smallest) value on ties
    let mut most = *entries.first().ok_or(AnonScopeError::EmptyTable)?;
    let mut least = most;
    for &entry in &entries[1..] {
        if entry.1 > most.1 {
            most = entry;
        }
        if entry.1 < least.1 {
            least = entry;
        }
    }

    let numeric = match table.column_kind(position) {
        ColumnKind::Numeric => {
            let mut numbers: Vec<f64> = table
                .column_values(position)
                .filter_map(Value::as_number)
                .collect();
            numbers.sort_by(f64::total_cmp);
            let n = numbers.len() as f64;
            let mean = numbers.iter().sum::<f64>() / n;
            let variance = numbers.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
            Some(NumericSummary {
                mean,
                median: median(&numbers),
                std_dev: variance.sqrt(),
                variance,
            })
        }
        _ => None,
    };

    Ok(QuasiIdentifierStats {
        column: column.to_string(),
        most_frequent: most.0.clone(),
        most_frequent_count: most.1,
        least_frequent: least.0.clone(),
        least_frequent_count: least.1,
        numeric,
    })
}

/// Average re-identification risk: the mean over classes of `1 / |EC|`.
pub fn average_reidentification_risk<Q: AsRef<str>>(table: &Table, quasi_identifiers: &[Q]) -> Result<f64> {
    let partition = qi_partition(table, quasi_identifiers)?;
    if partition.is_empty() {
        return Err(AnonScopeError::EmptyTable);
    }

    let total: f64 = partition
        .classes()
        .iter()
        .map(|class| 1.0 / class.len() as f64)
        .sum();
    let risk = total / partition.len() as f64;
    tracing::debug!("average re-identification risk: {}", risk);
    Ok(risk)
}
