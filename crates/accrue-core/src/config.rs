//! Module: config
//! Responsibility: engine tuning knobs and their validation.
//! Does not own: per-query policy (that belongs to the planner/executor).
//! Boundary: loaded once, then threaded read-only through `EvalContext`.

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

/// Initial capacity for DISTINCT value sets.
pub const DEFAULT_DISTINCT_CAPACITY: usize = 64;

/// Initial capacity for sequence and multiset accumulators.
pub const DEFAULT_LIST_CAPACITY: usize = 16;

/// Block length used by median-of-medians pivot selection.
pub const DEFAULT_MEDIAN_BLOCK_LEN: usize = 5;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("median_block_len must be an odd number >= 5, found {found}")]
    MedianBlockLen { found: usize },

    #[error("{field} must be non-zero")]
    ZeroCapacity { field: &'static str },
}

///
/// EngineConfig
///
/// Read-only tuning for accumulator allocation, order-statistic selection and
/// metrics emission. Missing TOML keys fall back to the defaults.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub distinct_capacity: usize,
    pub list_capacity: usize,
    pub median_block_len: usize,
    pub metrics: bool,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.distinct_capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "distinct_capacity",
            });
        }
        if self.list_capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "list_capacity",
            });
        }
        // even blocks have no single middle element; blocks of 3 lose the linear bound
        if self.median_block_len < 5 || self.median_block_len % 2 == 0 {
            return Err(ConfigError::MedianBlockLen {
                found: self.median_block_len,
            });
        }

        Ok(())
    }

    /// Inputs at or below this length are sorted directly instead of partitioned.
    #[must_use]
    pub const fn median_small_cutoff(&self) -> usize {
        self.median_block_len.saturating_mul(2)
    }

    #[must_use]
    pub const fn without_metrics(mut self) -> Self {
        self.metrics = false;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            distinct_capacity: DEFAULT_DISTINCT_CAPACITY,
            list_capacity: DEFAULT_LIST_CAPACITY,
            median_block_len: DEFAULT_MEDIAN_BLOCK_LEN,
            metrics: true,
        }
    }
}

///
/// TESTS
///
