//! Privacy-disclosure metrics.
//!
//! This module provides the nine metrics computed over quasi-identifier and
//! sensitive-attribute columns:
//! - **Anonymity**: k-anonymity, (α,k)-anonymity
//! - **Diversity**: l-diversity, entropy l-diversity, recursive (c,l)-diversity
//! - **Likeness**: basic and enhanced β-likeness
//! - **Disclosure**: δ-disclosure privacy
//! - **Closeness**: t-closeness
//!
//! Each metric is a plain function of `(table, quasi_identifiers, sensitive,
//! mode)` that validates its inputs and builds its own [`AttributeScope`].
//! The `*_in` variants take a prebuilt scope so a caller computing several
//! metrics over the same columns partitions the table only once.
//!
//! # Example
//! ```rust
//! use anonscope_core::metrics::{k_anonymity, l_diversity};
//! use anonscope_core::models::{Table, Value};
//! use anonscope_core::scope::AttributeMode;
//!
//! let table = Table::new(
//!     vec!["zip".to_string(), "disease".to_string()],
//!     vec![
//!         vec![Value::from("280"), Value::from("flu")],
//!         vec![Value::from("280"), Value::from("cold")],
//!     ],
//! )?;
//!
//! assert_eq!(k_anonymity(&table, &["zip"])?, 2);
//! assert_eq!(l_diversity(&table, &["zip"], &["disease"], AttributeMode::Generalized)?, 2);
//! # Ok::<(), anonscope_core::AnonScopeError>(())
//! ```
//!
//! [`AttributeScope`]: crate::scope::AttributeScope

mod anonymity;
mod beta_likeness;
mod delta_disclosure;
mod diversity;
mod t_closeness;

pub use anonymity::{
    AlphaK, alpha_k_anonymity, alpha_k_anonymity_in, k_anonymity, k_anonymity_of,
};
pub use beta_likeness::{
    basic_beta_likeness, basic_beta_likeness_in, enhanced_beta_likeness,
    enhanced_beta_likeness_in,
};
pub use delta_disclosure::{delta_disclosure, delta_disclosure_in};
pub use diversity::{
    RecursiveDiversity, entropy_l_diversity, entropy_l_diversity_in, l_diversity,
    l_diversity_in, recursive_c_l_diversity, recursive_c_l_diversity_in,
};
pub use t_closeness::{t_closeness, t_closeness_in};

/// Largest value of an iterator of floats, ignoring NaN.
pub(crate) fn max_f64<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    values.into_iter().fold(None, |acc, value| match acc {
        Some(current) if current >= value || value.is_nan() => Some(current),
        _ if value.is_nan() => acc,
        _ => Some(value),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Tables shared by the metric tests.

    use crate::models::{Table, Value};

    /// Ten patients, QI = (age, zip), SA = disease (categorical) and
    /// salary (numeric).
    ///
    /// Classes under (age, zip):
    /// - A (30, 280): flu, flu, cold, cancer
    /// - B (40, 281): flu, cold, cold
    /// - C (50, 282): cancer, flu, cold
    pub(crate) fn patients() -> Table {
        let rows = [
            (30, "280", "flu", 3),
            (30, "280", "flu", 4),
            (30, "280", "cold", 5),
            (30, "280", "cancer", 3),
            (40, "281", "flu", 6),
            (40, "281", "cold", 4),
            (40, "281", "cold", 8),
            (50, "282", "cancer", 9),
            (50, "282", "flu", 10),
            (50, "282", "cold", 11),
        ];
        Table::new(
            vec![
                "age".to_string(),
                "zip".to_string(),
                "disease".to_string(),
                "salary".to_string(),
            ],
            rows.iter()
                .map(|(age, zip, disease, salary)| {
                    vec![
                        Value::from(*age),
                        Value::from(*zip),
                        Value::from(*disease),
                        Value::from(*salary),
                    ]
                })
                .collect(),
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_f64_ignores_nan() {
        assert_eq!(max_f64([1.0, f64::NAN, 3.0, 2.0]), Some(3.0));
        assert_eq!(max_f64([f64::NAN, 0.5]), Some(0.5));
        assert_eq!(max_f64(Vec::<f64>::new()), None);
    }
}
