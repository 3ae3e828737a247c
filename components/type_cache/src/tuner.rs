//! Entropy-driven choice of the cache layout.
//!
//! Given every identity in the table, the tuner picks a slot count
//! (`2^log_size`) and a shift so that `(identity >> shift) & mask` spreads
//! the identities over the slots with as few collisions as possible.
//!
//! For each candidate layout it builds a histogram of identities per slot
//! and derives:
//!
//! - the Shannon entropy of the slot distribution, in bits;
//! - the collision probability `Σ (count - 1) / total` over shared slots;
//! - the number of occupied slots, which equals the population exactly when
//!   the layout is collision-free.
//!
//! Collision-free layouts win. Otherwise the strictly higher entropy wins,
//! and exact ties go to the larger shift, which drops more low-order bits.
//! Slot counts are tried smallest first and the search stops after the
//! first slot count that admits a collision-free layout.

use core_types::TypeIdentity;
use serde::{Deserialize, Serialize};
use std::f64::consts::LN_2;
use std::ops::RangeInclusive;

use crate::bits::{address_bits, bit_length, differing_bits, irrelevant_bits};

/// Entropies closer than this are an exact tie
const ENTROPY_EPSILON: f64 = 1e-9;

/// Distribution of a population under one layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutStats {
    /// Number of identities measured
    pub total: usize,
    /// Number of non-empty slots
    pub occupied: usize,
    /// Shannon entropy of the slot distribution in bits
    pub entropy: f64,
    /// Probability that an identity shares its slot
    pub conflict: f64,
}

impl LayoutStats {
    /// Every identity has a slot of its own
    #[inline]
    pub fn is_collision_free(&self) -> bool {
        self.occupied == self.total
    }
}

/// A measured `(log_size, shift)` pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// log2 of the slot count
    pub log_size: u32,
    /// Right shift applied to identities
    pub shift: u32,
    /// Measured distribution
    pub stats: LayoutStats,
}

impl Candidate {
    /// Whether this candidate should replace `other` as the best so far
    pub fn beats(&self, other: &Candidate) -> bool {
        match (self.stats.is_collision_free(), other.stats.is_collision_free()) {
            (true, false) => true,
            (false, true) => false,
            _ => {
                let delta = self.stats.entropy - other.stats.entropy;
                if delta > ENTROPY_EPSILON {
                    true
                } else if delta < -ENTROPY_EPSILON {
                    false
                } else {
                    self.shift > other.shift
                }
            }
        }
    }
}

/// Layout search over a fixed population
#[derive(Debug, Clone)]
pub struct Tuner {
    words: Vec<usize>,
    differing: usize,
    max_log_size: u32,
    histogram: Vec<u32>,
}

impl Tuner {
    /// Prepare a search over `identities`, never exceeding `max_log_size`
    pub fn new<I>(identities: I, max_log_size: u32) -> Self
    where
        I: IntoIterator<Item = TypeIdentity>,
    {
        let words: Vec<usize> = identities.into_iter().map(TypeIdentity::get).collect();
        let differing = differing_bits(words.iter().copied());
        Self {
            words,
            differing,
            max_log_size,
            histogram: Vec::new(),
        }
    }

    /// Size of the population
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the population is empty
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Mask of bits that differ somewhere in the population
    pub fn differing_bits(&self) -> usize {
        self.differing
    }

    /// Slot counts worth trying when the cache currently has `2^current`.
    ///
    /// From the larger of the current size and the size needed to address
    /// the population, up to one more than needed; both ends clamped.
    pub fn log_size_range(&self, current: u32) -> RangeInclusive<u32> {
        let needed = address_bits(self.words.len());
        let low = current.max(needed).min(self.max_log_size);
        let high = current.max(needed + 1).min(self.max_log_size);
        low..=high
    }

    /// Shifts worth trying for a slot count of `2^log_size`.
    ///
    /// Low bits that never differ carry no information and are skipped;
    /// shifting past the highest differing bit would only merge slots.
    pub fn shift_range(&self, log_size: u32) -> RangeInclusive<u32> {
        let low = irrelevant_bits(self.differing);
        let high = bit_length(self.differing).saturating_sub(log_size).max(low);
        low..=high
    }

    /// Measure the population under one layout
    pub fn stats_for(&mut self, log_size: u32, shift: u32) -> LayoutStats {
        let len = 1usize << log_size;
        let mask = len - 1;

        self.histogram.clear();
        self.histogram.resize(len, 0);
        for &word in &self.words {
            self.histogram[(word >> shift) & mask] += 1;
        }

        let total = self.words.len() as f64;
        let mut stats = LayoutStats {
            total: self.words.len(),
            occupied: 0,
            entropy: 0.0,
            conflict: 0.0,
        };

        for &count in &self.histogram {
            if count == 0 {
                continue;
            }
            let p = count as f64 / total;
            stats.occupied += 1;
            stats.entropy -= p * p.ln() / LN_2;
            if count > 1 {
                stats.conflict += (count - 1) as f64 / total;
            }
        }

        stats
    }

    /// Best layout for a cache currently at `current_log_size`/`current_shift`.
    ///
    /// Populations of zero or one identity are trivially collision-free and
    /// keep the current shift.
    pub fn search(&mut self, current_log_size: u32, current_shift: u32) -> Candidate {
        let sizes = self.log_size_range(current_log_size);
        let fallback_size = *sizes.start();

        if self.words.len() <= 1 {
            return Candidate {
                log_size: fallback_size,
                shift: current_shift,
                stats: self.stats_for(fallback_size, current_shift),
            };
        }

        let mut best: Option<Candidate> = None;

        for log_size in sizes {
            for shift in self.shift_range(log_size) {
                let candidate = Candidate {
                    log_size,
                    shift,
                    stats: self.stats_for(log_size, shift),
                };
                if best.map_or(true, |b| candidate.beats(&b)) {
                    best = Some(candidate);
                }
            }

            if best.is_some_and(|b| b.stats.is_collision_free()) {
                break;
            }
        }

        match best {
            Some(candidate) => candidate,
            None => Candidate {
                log_size: fallback_size,
                shift: current_shift,
                stats: self.stats_for(fallback_size, current_shift),
            },
        }
    }

    /// Every layout in the search bounds, without stopping early
    pub fn candidates(&mut self, current_log_size: u32) -> Vec<Candidate> {
        let mut out = Vec::new();
        for log_size in self.log_size_range(current_log_size) {
            for shift in self.shift_range(log_size) {
                let stats = self.stats_for(log_size, shift);
                out.push(Candidate {
                    log_size,
                    shift,
                    stats,
                });
            }
        }
        out
    }
}
