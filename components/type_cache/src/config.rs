//! Construction parameters for a dispatch cache.

use core_types::{CacheError, CacheResult, SourceLabel};
use serde::{Deserialize, Serialize};

use crate::bits::bit_length;

/// Population hint used when none is given
pub const DEFAULT_EXPECTED_SIZE: usize = 8;

/// Largest log size the cache grows to by default (64K slots)
pub const DEFAULT_MAX_LOG_SIZE: u32 = 16;

/// Upper limit accepted for `max_log_size`
pub const MAX_LOG_SIZE_LIMIT: u32 = 24;

/// Collisions tolerated between retunes that left collisions behind
pub const DEFAULT_COLLISION_BUDGET: u32 = 4;

/// Budget after a collision-free retune, and of a fresh cache
pub const FRAGILE_COLLISION_BUDGET: u32 = 1;

/// Configuration of a [`DispatchCache`](crate::DispatchCache).
///
/// # Examples
///
/// ```
/// use type_cache::CacheConfig;
///
/// let config = CacheConfig::default()
///     .with_expected_size(32)
///     .with_max_log_size(10);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.initial_log_size(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Expected number of distinct types; pre-sizes the slots and the table
    pub expected_size: usize,
    /// Upper bound on the log2 of the slot count
    pub max_log_size: u32,
    /// Collisions tolerated before retuning when the layout has collisions
    pub collision_budget: u32,
    /// Where the owning dispatch site lives, for reports only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<SourceLabel>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expected_size: DEFAULT_EXPECTED_SIZE,
            max_log_size: DEFAULT_MAX_LOG_SIZE,
            collision_budget: DEFAULT_COLLISION_BUDGET,
            label: None,
        }
    }
}

impl CacheConfig {
    /// Set the expected population
    pub fn with_expected_size(mut self, expected_size: usize) -> Self {
        self.expected_size = expected_size;
        self
    }

    /// Set the maximum log size
    pub fn with_max_log_size(mut self, max_log_size: u32) -> Self {
        self.max_log_size = max_log_size;
        self
    }

    /// Set the collision budget
    pub fn with_collision_budget(mut self, collision_budget: u32) -> Self {
        self.collision_budget = collision_budget;
        self
    }

    /// Attach a diagnostic label
    pub fn with_label(mut self, label: SourceLabel) -> Self {
        self.label = Some(label);
        self
    }

    /// Check the configuration
    pub fn validate(&self) -> CacheResult<()> {
        if self.expected_size == 0 {
            return Err(CacheError::InvalidExpectedSize(self.expected_size));
        }
        if self.max_log_size == 0 || self.max_log_size > MAX_LOG_SIZE_LIMIT {
            return Err(CacheError::InvalidMaxLogSize {
                got: self.max_log_size,
                max: MAX_LOG_SIZE_LIMIT,
            });
        }
        if self.collision_budget == 0 {
            return Err(CacheError::InvalidCollisionBudget);
        }
        Ok(())
    }

    /// Log size of the slot array before the first retune
    pub fn initial_log_size(&self) -> u32 {
        bit_length(self.expected_size.saturating_sub(1)).min(self.max_log_size)
    }
}
