//! Read-only diagnostics of a dispatch cache.

use std::collections::BTreeMap;
use std::fmt;

use core_types::{LookupProfile, SourceLabel, TypeIdentity};
use serde::Serialize;

use crate::bits::{bit_pattern, differing_bits, differing_width};
use crate::cache::SlotCache;
use crate::config::CacheConfig;
use crate::table::TypeTable;
use crate::tuner::{Candidate, LayoutStats, Tuner};

/// One identity as placed by the current layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReportRow {
    /// The identity
    pub identity: TypeIdentity,
    /// Slot the identity maps to
    pub slot: usize,
    /// Number of identities mapping to the same slot
    pub load: u32,
    /// Lookups that returned this identity's value
    pub hits: u64,
}

/// Snapshot of a cache layout, its population and its counters
#[derive(Debug, Clone, Serialize)]
pub struct CacheReport {
    /// Label of the owning dispatch site
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<SourceLabel>,
    /// Number of distinct identities
    pub total: usize,
    /// log2 of the slot count
    pub log_size: u32,
    /// Right shift applied to identities
    pub shift: u32,
    /// Mask of bits that differ across identities
    pub differing_bits: usize,
    /// Word rendered MSB first, `X` on differing bits
    pub pattern: String,
    /// Span of the differing bits
    pub width: u32,
    /// Distribution under the active layout
    pub stats: LayoutStats,
    /// Slot load → number of slots with that load, non-empty loads only
    pub histogram: BTreeMap<u32, usize>,
    /// Percentage of empty slots, rounded down
    pub unused_percent: usize,
    /// Identities in ascending order
    pub rows: Vec<ReportRow>,
    /// Every layout within the search bounds
    pub candidates: Vec<Candidate>,
    /// Lookup counters
    pub profile: LookupProfile,
}

impl CacheReport {
    pub(crate) fn capture<V>(
        slots: &SlotCache,
        table: &TypeTable<V>,
        config: &CacheConfig,
        profile: &LookupProfile,
    ) -> Self {
        let log_size = slots.log_size();
        let shift = slots.shift();
        let mask = slots.len() - 1;
        let slot_of = |identity: TypeIdentity| (identity.get() >> shift) & mask;

        let mut loads = vec![0u32; slots.len()];
        for identity in table.identities() {
            loads[slot_of(identity)] += 1;
        }

        let mut histogram = BTreeMap::new();
        for &load in loads.iter().filter(|&&load| load > 0) {
            *histogram.entry(load).or_insert(0) += 1;
        }
        let unused = loads.iter().filter(|&&load| load == 0).count();

        let mut rows: Vec<ReportRow> = table
            .identities()
            .map(|identity| ReportRow {
                identity,
                slot: slot_of(identity),
                load: loads[slot_of(identity)],
                hits: table.hits(identity).unwrap_or(0),
            })
            .collect();
        rows.sort_by_key(|row| row.identity);

        let differing = differing_bits(table.identities().map(TypeIdentity::get));
        let sample = table.identities().next().map_or(0, TypeIdentity::get);

        let mut tuner = Tuner::new(table.identities(), config.max_log_size);
        let stats = tuner.stats_for(log_size, shift);
        let candidates = tuner.candidates(log_size);

        Self {
            label: config.label.clone(),
            total: table.len(),
            log_size,
            shift,
            differing_bits: differing,
            pattern: bit_pattern(sample, differing),
            width: differing_width(differing),
            stats,
            histogram,
            unused_percent: unused * 100 / slots.len(),
            rows,
            candidates,
            profile: *profile,
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for CacheReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            writeln!(f, "{label}")?;
        }

        for row in &self.rows {
            write!(
                f,
                "Type:   {:0width$b} -> {}\t{} \t",
                row.identity.get(),
                row.slot,
                row.hits,
                width = usize::BITS as usize
            )?;
            if row.load > 1 {
                writeln!(f, "[{}]", row.load)?;
            } else {
                writeln!(f)?;
            }
        }

        write!(
            f,
            "TYPES:  {} total={} log_size={} shift={} width={} retunes={} entropy={:.4} conflict={:.4}\t",
            self.pattern,
            self.total,
            self.log_size,
            self.shift,
            self.width,
            self.profile.retunes,
            self.stats.entropy,
            self.stats.conflict,
        )?;
        for (load, count) in self.histogram.iter().rev() {
            write!(f, "{load}->{count}; ")?;
        }
        writeln!(f, "{}% unused", self.unused_percent)?;

        for candidate in &self.candidates {
            writeln!(
                f,
                "  log_size={} shift={} entropy={:.4} conflict={:.4} occupied={}/{}",
                candidate.log_size,
                candidate.shift,
                candidate.stats.entropy,
                candidate.stats.conflict,
                candidate.stats.occupied,
                candidate.stats.total,
            )?;
        }
        Ok(())
    }
}
