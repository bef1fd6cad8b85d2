//! Privacy analysis configuration.
//!
//! Holds the attribute mode and the optional thresholds each metric is
//! checked against. Thresholds left unset are not checked.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{AnonScopeError, Result};
use crate::scope::AttributeMode;

/// Acceptance thresholds for the privacy metrics.
///
/// `min_*` thresholds are violated when the measured value is lower,
/// `max_*` thresholds when it is higher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrivacyThresholds {
    /// Minimum k for k-anonymity
    pub min_k: Option<usize>,
    /// Maximum α for (α,k)-anonymity (0.0-1.0)
    pub max_alpha: Option<f64>,
    /// Minimum l for l-diversity
    pub min_l: Option<usize>,
    /// Minimum l for entropy l-diversity
    pub min_entropy_l: Option<usize>,
    /// Maximum c for recursive (c,l)-diversity
    pub max_c: Option<usize>,
    /// Maximum β for basic β-likeness
    pub max_basic_beta: Option<f64>,
    /// Maximum β for enhanced β-likeness
    pub max_enhanced_beta: Option<f64>,
    /// Maximum δ for δ-disclosure privacy
    pub max_delta: Option<f64>,
    /// Maximum t for t-closeness (0.0-1.0)
    pub max_t: Option<f64>,
}

impl PrivacyThresholds {
    /// Returns true when no threshold is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Privacy analysis configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// How several sensitive attributes are combined
    pub mode: AttributeMode,
    /// Acceptance thresholds
    pub thresholds: PrivacyThresholds,
}

/// Validation errors for analysis configuration.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("max_alpha must be between 0.0 and 1.0, got {0}")]
    InvalidAlpha(f64),
    #[error("max_t must be between 0.0 and 1.0, got {0}")]
    InvalidCloseness(f64),
    #[error("{metric} must be a non-negative number, got {value}")]
    NegativeThreshold { metric: &'static str, value: f64 },
}

fn clamp_unit(name: &str, value: f64) -> f64 {
    if !(0.0..=1.0).contains(&value) {
        tracing::warn!("{} {} clamped to valid range [0.0, 1.0]", name, value);
    }
    value.clamp(0.0, 1.0)
}

fn clamp_non_negative(name: &str, value: f64) -> f64 {
    if value < 0.0 {
        tracing::warn!("{} {} clamped to 0.0", name, value);
    }
    value.max(0.0)
}

impl AnalysisConfig {
    /// Creates a config with generalized mode and no thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a config from a JSON file and validates it.
    ///
    /// # Errors
    /// - `Io` if the file cannot be read
    /// - `Serialization` if it is not a valid config document
    /// - `Configuration` if a threshold is out of range
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AnonScopeError::io(format!("reading config {}", path.display()), e))?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            AnonScopeError::serialization(format!("parsing config {}", path.display()), e)
        })?;
        config
            .validate()
            .map_err(|e| AnonScopeError::configuration(e.to_string()))?;

        tracing::debug!("Loaded analysis config from {}", path.display());
        Ok(config)
    }

    /// Builder method to set the attribute mode.
    pub fn with_mode(mut self, mode: AttributeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder method to set the minimum k.
    pub fn with_min_k(mut self, k: usize) -> Self {
        self.thresholds.min_k = Some(k);
        self
    }

    /// Builder method to set the maximum α, clamped to [0.0, 1.0].
    pub fn with_max_alpha(mut self, alpha: f64) -> Self {
        self.thresholds.max_alpha = Some(clamp_unit("max_alpha", alpha));
        self
    }

    /// Builder method to set the minimum l.
    pub fn with_min_l(mut self, l: usize) -> Self {
        self.thresholds.min_l = Some(l);
        self
    }

    /// Builder method to set the minimum entropy l.
    pub fn with_min_entropy_l(mut self, l: usize) -> Self {
        self.thresholds.min_entropy_l = Some(l);
        self
    }

    /// Builder method to set the maximum recursive c.
    pub fn with_max_c(mut self, c: usize) -> Self {
        self.thresholds.max_c = Some(c);
        self
    }

    /// Builder method to set the maximum basic β.
    pub fn with_max_basic_beta(mut self, beta: f64) -> Self {
        self.thresholds.max_basic_beta = Some(clamp_non_negative("max_basic_beta", beta));
        self
    }

    /// Builder method to set the maximum enhanced β.
    pub fn with_max_enhanced_beta(mut self, beta: f64) -> Self {
        self.thresholds.max_enhanced_beta = Some(clamp_non_negative("max_enhanced_beta", beta));
        self
    }

    /// Builder method to set the maximum δ.
    pub fn with_max_delta(mut self, delta: f64) -> Self {
        self.thresholds.max_delta = Some(clamp_non_negative("max_delta", delta));
        self
    }

    /// Builder method to set the maximum t, clamped to [0.0, 1.0].
    pub fn with_max_t(mut self, t: f64) -> Self {
        self.thresholds.max_t = Some(clamp_unit("max_t", t));
        self
    }

    /// Applies one `metric:value` style override.
    ///
    /// Metric names are the threshold field names with or without their
    /// `min_`/`max_` prefix (`k`, `alpha`, `l`, `entropy_l`, `c`,
    /// `basic_beta`, `enhanced_beta`, `delta`, `t`).
    ///
    /// # Errors
    /// Returns `Configuration` for an unknown metric or a value of the
    /// wrong type.
    pub fn with_override(self, metric: &str, value: &str) -> Result<Self> {
        let key = metric.trim().to_lowercase();
        let key = key
            .strip_prefix("min_")
            .or_else(|| key.strip_prefix("max_"))
            .unwrap_or(&key);

        let integer = || {
            value.trim().parse::<usize>().map_err(|_| {
                AnonScopeError::configuration(format!(
                    "threshold '{}' expects a non-negative integer, got '{}'",
                    metric, value
                ))
            })
        };
        let real = || {
            value.trim().parse::<f64>().map_err(|_| {
                AnonScopeError::configuration(format!(
                    "threshold '{}' expects a number, got '{}'",
                    metric, value
                ))
            })
        };

        Ok(match key {
            "k" => self.with_min_k(integer()?),
            "alpha" => self.with_max_alpha(real()?),
            "l" => self.with_min_l(integer()?),
            "entropy_l" => self.with_min_entropy_l(integer()?),
            "c" => self.with_max_c(integer()?),
            "basic_beta" => self.with_max_basic_beta(real()?),
            "enhanced_beta" => self.with_max_enhanced_beta(real()?),
            "delta" => self.with_max_delta(real()?),
            "t" => self.with_max_t(real()?),
            _ => {
                return Err(AnonScopeError::configuration(format!(
                    "unknown privacy metric '{}'",
                    metric
                )));
            }
        })
    }

    /// Validates the configuration.
    ///
    /// Returns an error if any threshold is outside its valid range.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        let thresholds = &self.thresholds;
        if let Some(alpha) = thresholds.max_alpha
            && !(0.0..=1.0).contains(&alpha)
        {
            return Err(ConfigValidationError::InvalidAlpha(alpha));
        }
        if let Some(t) = thresholds.max_t
            && !(0.0..=1.0).contains(&t)
        {
            return Err(ConfigValidationError::InvalidCloseness(t));
        }
        for (metric, value) in [
            ("max_basic_beta", thresholds.max_basic_beta),
            ("max_enhanced_beta", thresholds.max_enhanced_beta),
            ("max_delta", thresholds.max_delta),
        ] {
            if let Some(value) = value
                && !(value >= 0.0)
            {
                return Err(ConfigValidationError::NegativeThreshold { metric, value });
            }
        }
        Ok(())
    }
}
