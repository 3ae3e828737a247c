//! Lookup controller tying the slot cache, the table and the tuner together.
//!
//! A lookup probes the slot of its identity. On a hit the value comes
//! straight from the table entry the slot designates. On a miss the table
//! is consulted and, for an identity seen for the first time, a value is
//! created and published to the slot.
//!
//! Collisions (a new identity landing on a slot held by another identity)
//! drain a small budget, but only once the table has grown since the last
//! retune: without growth a retune would find the same layout again. When
//! the budget runs out the lookup retunes the layout synchronously and
//! rebuilds every slot from the table before returning.

use core_types::{CacheResult, HasTypeIdentity, LookupProfile, TypeIdentity};
use std::convert::Infallible;

use crate::cache::SlotCache;
use crate::config::{CacheConfig, FRAGILE_COLLISION_BUDGET};
use crate::report::CacheReport;
use crate::table::TypeTable;
use crate::tuner::{Candidate, Tuner};

/// Adaptive cache mapping dynamic type identities to values.
///
/// # Examples
///
/// ```
/// use type_cache::DispatchCache;
/// use core_types::TypeIdentity;
///
/// let mut cache: DispatchCache<u32> = DispatchCache::new();
/// let circle = TypeIdentity::from_word(0x7f00_1040);
///
/// *cache.lookup(circle) += 1;
/// *cache.lookup(circle) += 1;
///
/// assert_eq!(cache.get(circle), Some(&2));
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug)]
pub struct DispatchCache<V> {
    slots: SlotCache,
    table: TypeTable<V>,
    config: CacheConfig,
    /// Table size memoized at the last retune
    last_table_size: usize,
    /// Collisions still tolerated before the next retune
    collisions_before_update: u32,
    profile: LookupProfile,
}

impl<V> DispatchCache<V> {
    /// Create a cache with the default configuration
    pub fn new() -> Self {
        Self::build(CacheConfig::default())
    }

    /// Create a cache pre-sized for `expected_size` distinct types.
    ///
    /// A hint of zero is treated as one.
    pub fn with_expected_size(expected_size: usize) -> Self {
        Self::build(CacheConfig::default().with_expected_size(expected_size.max(1)))
    }

    /// Create a cache from an explicit configuration
    pub fn with_config(config: CacheConfig) -> CacheResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: CacheConfig) -> Self {
        Self {
            slots: SlotCache::new(config.initial_log_size()),
            // the population hint never pre-sizes past the largest slot array
            table: TypeTable::with_capacity(config.expected_size.min(1usize << config.max_log_size)),
            config,
            last_table_size: 0,
            collisions_before_update: FRAGILE_COLLISION_BUDGET,
            profile: LookupProfile::new(),
        }
    }

    /// Value for `identity`, default-constructed on first sight
    #[inline]
    pub fn lookup(&mut self, identity: TypeIdentity) -> &mut V
    where
        V: Default,
    {
        self.lookup_or_insert_with(identity, V::default)
    }

    /// Value for a raw identity word.
    ///
    /// # Panics
    ///
    /// Panics if `word` is zero.
    #[inline]
    #[track_caller]
    pub fn lookup_word(&mut self, word: usize) -> &mut V
    where
        V: Default,
    {
        self.lookup(TypeIdentity::from_word(word))
    }

    /// Value for the dynamic type of `object`
    #[inline]
    pub fn lookup_for<O>(&mut self, object: &O) -> &mut V
    where
        O: HasTypeIdentity + ?Sized,
        V: Default,
    {
        self.lookup(object.type_identity())
    }

    /// Value for `identity`, built by `make` on first sight
    #[inline]
    pub fn lookup_or_insert_with<F>(&mut self, identity: TypeIdentity, make: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        match self.try_lookup_or_insert_with(identity, || Ok::<V, Infallible>(make())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Value for `identity`, built by the fallible `make` on first sight.
    ///
    /// When `make` fails its error is returned and neither the slots, the
    /// table nor the collision budget change.
    pub fn try_lookup_or_insert_with<E, F>(&mut self, identity: TypeIdentity, make: F) -> Result<&mut V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let index = self.slots.index_of(identity);
        let slot = self.slots.slot(index);

        if slot.identity == Some(identity) {
            self.profile.record_hit();
            return Ok(self.table.touch(slot.entry));
        }

        self.profile.record_miss();

        let entry = match self.table.find(identity) {
            Some(entry) => entry,
            None => {
                let value = make()?;
                let displaced = slot.identity.is_some();

                if displaced {
                    self.profile.record_collision();
                }

                if displaced && self.table.len() != self.last_table_size {
                    self.collisions_before_update -= 1;
                    tracing::trace!(
                        identity = %identity,
                        remaining = self.collisions_before_update,
                        "slot collision"
                    );

                    if self.collisions_before_update == 0 {
                        let entry = self.insert(identity, value);
                        self.retune();
                        return Ok(self.table.touch(entry));
                    }
                }

                self.insert(identity, value)
            }
        };

        self.slots.publish(index, identity, entry);
        Ok(self.table.touch(entry))
    }

    fn insert(&mut self, identity: TypeIdentity, value: V) -> usize {
        self.profile.record_insertion();
        self.table.insert(identity, value)
    }

    /// Recompute the layout from the whole table and rebuild every slot.
    ///
    /// Lookups do this on their own when collisions pile up; calling it
    /// directly is useful after a warm-up phase.
    pub fn rehash(&mut self) -> Candidate {
        self.retune()
    }

    fn retune(&mut self) -> Candidate {
        self.profile.record_retune();
        self.last_table_size = self.table.len();

        let current = self.slots.log_size();
        let mut tuner = Tuner::new(self.table.identities(), self.config.max_log_size);
        let choice = tuner.search(current, self.slots.shift());
        let collision_free = choice.stats.is_collision_free();

        self.collisions_before_update = if collision_free {
            FRAGILE_COLLISION_BUDGET
        } else {
            self.config.collision_budget
        };

        self.slots.rebuild(
            choice.log_size.max(current),
            choice.shift,
            self.table.identities().enumerate(),
        );

        tracing::debug!(
            label = ?self.config.label,
            entries = self.table.len(),
            log_size = self.slots.log_size(),
            shift = choice.shift,
            collision_free,
            entropy = choice.stats.entropy,
            conflict = choice.stats.conflict,
            "retuned dispatch cache"
        );

        choice
    }

    /// Value of `identity` without creating it or touching the slots
    pub fn get(&self, identity: TypeIdentity) -> Option<&V> {
        self.table.get(identity)
    }

    /// Whether `identity` has a value
    pub fn contains(&self, identity: TypeIdentity) -> bool {
        self.table.find(identity).is_some()
    }

    /// Whether a lookup of `identity` would hit right now
    pub fn is_cached(&self, identity: TypeIdentity) -> bool {
        self.slots.probe(identity).is_some()
    }

    /// Number of lookups that returned `identity`'s value
    pub fn hits(&self, identity: TypeIdentity) -> Option<u64> {
        self.table.hits(identity)
    }

    /// Number of distinct identities
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no identity was looked up yet
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// `(identity, value)` pairs in first-seen order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (TypeIdentity, &V)> + '_ {
        self.table.iter()
    }

    /// `(identity, value)` pairs in first-seen order, values mutable
    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = (TypeIdentity, &mut V)> + '_ {
        self.table.iter_mut()
    }

    /// log2 of the slot count
    pub fn log_size(&self) -> u32 {
        self.slots.log_size()
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Right shift currently applied to identities
    pub fn shift(&self) -> u32 {
        self.slots.shift()
    }

    /// Slot an identity maps to under the current layout
    pub fn slot_of(&self, identity: TypeIdentity) -> usize {
        self.slots.index_of(identity)
    }

    /// Collisions still tolerated before the next retune
    pub fn collision_budget(&self) -> u32 {
        self.collisions_before_update
    }

    /// Lookup counters
    pub fn profile(&self) -> &LookupProfile {
        &self.profile
    }

    /// Configuration the cache was built with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Read-only diagnostic snapshot
    pub fn report(&self) -> CacheReport {
        CacheReport::capture(&self.slots, &self.table, &self.config, &self.profile)
    }
}

impl<V> Default for DispatchCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
