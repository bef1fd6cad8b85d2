//! Multi-attribute evaluation scope.
//!
//! Metrics over several sensitive attributes run in one of two modes:
//!
//! - **Generalized**: one partition from the quasi-identifiers; every
//!   sensitive attribute is measured over it and the worst value per class
//!   is kept.
//! - **Independent**: for each sensitive attribute, the *other* sensitive
//!   attributes are folded into the quasi-identifier set, the table is
//!   re-partitioned, and only that attribute is measured.
//!
//! [`AttributeScope`] captures either shape as a list of [`ScopeView`]s so
//! every metric iterates the same structure. A scope borrows its table and
//! can be reused across metric calls; results never depend on whether a
//! scope was reused or freshly built.

use serde::{Deserialize, Serialize};

use crate::error::{AnonScopeError, Result};
use crate::models::Table;
use crate::partition::{Partition, partition_by_positions};
use crate::validation::{require_sensitive_attributes, resolve_columns, validate_columns};

/// How several sensitive attributes are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeMode {
    /// Single partition, worst attribute per class
    #[default]
    Generalized,
    /// Other sensitive attributes join the quasi-identifiers per attribute
    Independent,
}

impl std::fmt::Display for AttributeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeMode::Generalized => write!(f, "generalized"),
            AttributeMode::Independent => write!(f, "independent"),
        }
    }
}

impl std::str::FromStr for AttributeMode {
    type Err = AnonScopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "generalized" | "gen" => Ok(AttributeMode::Generalized),
            "independent" => Ok(AttributeMode::Independent),
            other => Err(AnonScopeError::configuration(format!(
                "unknown attribute mode '{}'",
                other
            ))),
        }
    }
}

/// A sensitive attribute resolved against a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveColumn {
    /// Column name
    pub name: String,
    /// Schema position
    pub position: usize,
}

/// One partition together with the sensitive attributes measured over it.
#[derive(Debug, Clone)]
pub struct ScopeView {
    partition: Partition,
    attributes: Vec<SensitiveColumn>,
}

impl ScopeView {
    /// The partition for this view.
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Sensitive attributes measured over the partition.
    pub fn attributes(&self) -> &[SensitiveColumn] {
        &self.attributes
    }
}

/// Precomputed partitions for one (table, QI, SA, mode) combination.
#[derive(Debug, Clone)]
pub struct AttributeScope<'t> {
    table: &'t Table,
    mode: AttributeMode,
    quasi_identifiers: Vec<usize>,
    views: Vec<ScopeView>,
}

impl<'t> AttributeScope<'t> {
    /// Validates the columns and builds the partitions for `mode`.
    ///
    /// # Errors
    /// - `ColumnNotFound` naming every missing QI/SA column
    /// - `EmptySelection` if no sensitive attribute was given
    pub fn build<Q, S>(
        table: &'t Table,
        quasi_identifiers: &[Q],
        sensitive: &[S],
        mode: AttributeMode,
    ) -> Result<Self>
    where
        Q: AsRef<str>,
        S: AsRef<str>,
    {
        validate_columns(table, quasi_identifiers, sensitive)?;
        require_sensitive_attributes(sensitive)?;

        let qi_positions = resolve_columns(table, quasi_identifiers)?;
        let attributes: Vec<SensitiveColumn> = resolve_columns(table, sensitive)?
            .into_iter()
            .zip(sensitive.iter())
            .map(|(position, name)| SensitiveColumn {
                name: name.as_ref().to_string(),
                position,
            })
            .collect();

        let views = match mode {
            AttributeMode::Generalized => vec![ScopeView {
                partition: partition_by_positions(table, &qi_positions),
                attributes,
            }],
            AttributeMode::Independent => attributes
                .iter()
                .enumerate()
                .map(|(index, attribute)| {
                    let enlarged: Vec<usize> = qi_positions
                        .iter()
                        .copied()
                        .chain(
                            attributes
                                .iter()
                                .enumerate()
                                .filter(|(other, _)| *other != index)
                                .map(|(_, other)| other.position),
                        )
                        .collect();
                    ScopeView {
                        partition: partition_by_positions(table, &enlarged),
                        attributes: vec![attribute.clone()],
                    }
                })
                .collect(),
        };

        tracing::debug!(
            "Built {} scope with {} view(s) over {} records",
            mode,
            views.len(),
            table.len()
        );

        Ok(Self {
            table,
            mode,
            quasi_identifiers: qi_positions,
            views,
        })
    }

    /// The table this scope was built from.
    pub fn table(&self) -> &'t Table {
        self.table
    }

    /// The attribute mode.
    pub fn mode(&self) -> AttributeMode {
        self.mode
    }

    /// The views to measure.
    pub fn views(&self) -> &[ScopeView] {
        &self.views
    }

    /// The quasi-identifier-only partition.
    ///
    /// In generalized mode this is the single view's partition; in
    /// independent mode it is recomputed from the quasi-identifiers alone.
    pub fn quasi_identifier_partition(&self) -> Partition {
        match self.mode {
            AttributeMode::Generalized => self
                .views
                .first()
                .map(|view| view.partition.clone())
                .unwrap_or_else(|| partition_by_positions(self.table, &self.quasi_identifiers)),
            AttributeMode::Independent => {
                partition_by_positions(self.table, &self.quasi_identifiers)
            }
        }
    }

    /// Fails with `EmptyTable` when there is nothing to aggregate.
    pub(crate) fn ensure_records(&self) -> Result<()> {
        if self.table.is_empty() {
            return Err(AnonScopeError::EmptyTable);
        }
        Ok(())
    }
}
