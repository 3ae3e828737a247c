//! Lookup profiling for dispatch caches
//!
//! Tracks how often lookups resolve in the direct-mapped cache, how often
//! they fall back to the table, and how often the cache layout is retuned.

use serde::{Deserialize, Serialize};

/// Aggregate lookup counters of one cache instance
///
/// Every lookup is either a hit or a miss. A miss may additionally be an
/// insertion (first sighting of an identity), and an insertion may be a
/// collision (it displaced a different identity from its slot).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupProfile {
    /// Number of lookups performed
    pub lookups: u64,
    /// Lookups resolved directly by the cache
    pub hits: u64,
    /// Lookups that had to consult the table
    pub misses: u64,
    /// New identities added to the table
    pub insertions: u64,
    /// Insertions that displaced another identity from its slot
    pub collisions: u64,
    /// Number of cache layout recomputations
    pub retunes: u64,
}

impl LookupProfile {
    /// Create an empty profile
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a lookup answered by the cache
    #[inline]
    pub fn record_hit(&mut self) {
        self.lookups += 1;
        self.hits += 1;
    }

    /// Record a lookup that had to consult the table
    #[inline]
    pub fn record_miss(&mut self) {
        self.lookups += 1;
        self.misses += 1;
    }

    /// Record the insertion of a new identity
    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    /// Record an insertion that displaced another identity
    pub fn record_collision(&mut self) {
        self.collisions += 1;
    }

    /// Record a recomputation of the cache layout
    pub fn record_retune(&mut self) {
        self.retunes += 1;
    }

    /// Fraction of lookups answered by the cache, `None` before any lookup
    pub fn hit_rate(&self) -> Option<f64> {
        if self.lookups == 0 {
            return None;
        }
        Some(self.hits as f64 / self.lookups as f64)
    }

    /// Clear all counters
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
