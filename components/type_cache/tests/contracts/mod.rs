//! Contract tests for the type_cache API
//!
//! These tests pin down the observable guarantees of a dispatch cache.

use std::collections::HashSet;

use core_types::TypeIdentity;
use type_cache::{CacheConfig, DispatchCache, Tuner};

fn id(word: usize) -> TypeIdentity {
    TypeIdentity::from_word(word)
}

/// Identities sharing their five lowest bits spread over distinct slots
/// once the layout is recomputed
#[test]
fn test_shared_low_bits_contract() {
    let ids = [id(0b1001_0000), id(0b1010_0000), id(0b1100_0000)];
    let mut cache: DispatchCache<usize> = DispatchCache::with_expected_size(2);
    assert_eq!(cache.log_size(), 1);

    for (n, identity) in ids.iter().enumerate() {
        *cache.lookup(*identity) = n;
    }
    cache.rehash();

    assert!(cache.shift() >= 5);
    assert!(cache.log_size() >= 2);

    let slots: HashSet<usize> = ids.iter().map(|identity| cache.slot_of(*identity)).collect();
    assert_eq!(slots.len(), ids.len());
    for (n, identity) in ids.iter().enumerate() {
        assert!(cache.is_cached(*identity));
        assert_eq!(cache.get(*identity), Some(&n));
    }
}

/// Same population driven by lookups alone: the second insertion collides
/// and retunes to two slots, while the third collides after a retune the
/// table has not grown past, so it evicts the first identity instead
#[test]
fn test_shared_low_bits_without_explicit_rehash() {
    let ids = [id(0b1001_0000), id(0b1010_0000), id(0b1100_0000)];
    let mut cache: DispatchCache<usize> = DispatchCache::with_expected_size(2);

    for (n, identity) in ids.iter().enumerate() {
        *cache.lookup(*identity) = n;
    }

    assert_eq!(cache.profile().retunes, 1);
    assert_eq!(cache.log_size(), 1);
    assert_eq!(cache.shift(), 5);
    assert!(!cache.is_cached(ids[0]));
    assert!(cache.is_cached(ids[1]));
    assert!(cache.is_cached(ids[2]));
    for (n, identity) in ids.iter().enumerate() {
        assert_eq!(cache.get(*identity), Some(&n));
    }

    // the evicted identity is refilled from the table, not rebuilt
    *cache.lookup(ids[0]) += 10;
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.get(ids[0]), Some(&10));
    assert!(cache.is_cached(ids[0]));
}

/// Repeated lookups of one identity reach the same value, also across
/// retunes triggered by other identities
#[test]
fn test_idempotent_retrieval_contract() {
    let mut cache: DispatchCache<u64> = DispatchCache::with_expected_size(1);
    let anchor = id(0x7000);

    *cache.lookup(anchor) += 1;
    for k in 1..64 {
        cache.lookup(id(0x7000 + k * 0x40));
        *cache.lookup(anchor) += 1;
    }

    assert!(cache.profile().retunes > 0);
    assert_eq!(cache.get(anchor), Some(&64));
}

/// The table holds exactly one entry per distinct identity
#[test]
fn test_growth_contract() {
    let mut cache: DispatchCache<()> = DispatchCache::new();
    for k in 1..=100 {
        cache.lookup(id(k * 24));
    }
    assert_eq!(cache.len(), 100);

    for k in 1..=100 {
        cache.lookup(id(k * 24));
    }
    assert_eq!(cache.len(), 100);
    assert_eq!(cache.profile().insertions, 100);
}

/// After a collision-free retune every identity hits directly
#[test]
fn test_post_rehash_consistency_contract() {
    let ids: Vec<TypeIdentity> = (1..=20).map(|k| id(0x5000 + k * 16)).collect();
    let mut cache: DispatchCache<()> = DispatchCache::new();
    for identity in &ids {
        cache.lookup(*identity);
    }

    let choice = cache.rehash();
    assert!(choice.stats.is_collision_free());

    let hits_before = cache.profile().hits;
    for identity in &ids {
        assert!(cache.is_cached(*identity));
        cache.lookup(*identity);
    }
    assert_eq!(cache.profile().hits - hits_before, ids.len() as u64);
}

/// Insertion alone drives a population with distinct low bits to a
/// collision-free layout
#[test]
fn test_zero_collision_convergence_contract() {
    let ids: Vec<TypeIdentity> = (1..=20).map(|k| id(0x5000 + k * 16)).collect();
    let mut cache: DispatchCache<()> = DispatchCache::new();

    for _ in 0..3 {
        for identity in &ids {
            cache.lookup(*identity);
        }
    }

    assert_eq!(cache.log_size(), 5);
    assert_eq!(cache.shift(), 4);

    let stats = cache.report().stats;
    assert_eq!(stats.conflict, 0.0);
    assert_eq!(stats.occupied, ids.len());

    let misses = cache.profile().misses;
    for identity in &ids {
        cache.lookup(*identity);
    }
    assert_eq!(cache.profile().misses, misses);
}

/// Aligned addresses converge as well
#[test]
fn test_aligned_population_convergence_contract() {
    let ids: Vec<TypeIdentity> = (0..40).map(|k| id(0x7f_0000 + 64 * k)).collect();
    let mut cache: DispatchCache<()> = DispatchCache::new();

    for identity in &ids {
        cache.lookup(*identity);
    }

    assert_eq!(cache.log_size(), 6);
    assert_eq!(cache.shift(), 6);
    assert!(ids.iter().all(|identity| cache.is_cached(*identity)));
}

/// Equal entropy goes to the larger shift
#[test]
fn test_entropy_tie_break_contract() {
    let mut tuner = Tuner::new([id(0x10), id(0x20)], 16);

    let low = tuner.stats_for(1, 4);
    let high = tuner.stats_for(1, 5);
    assert_eq!(low.entropy, high.entropy);

    let best = tuner.search(1, 0);
    assert_eq!(best.shift, 5);
}

/// A zero identity halts instead of answering
#[test]
#[should_panic(expected = "type identity must be non-zero")]
fn test_zero_identity_is_fatal_contract() {
    let mut cache: DispatchCache<()> = DispatchCache::new();
    cache.lookup_word(0);
}

/// The slot array never exceeds the configured maximum
#[test]
fn test_max_log_size_contract() {
    let config = CacheConfig::default().with_max_log_size(4);
    let mut cache: DispatchCache<()> = DispatchCache::with_config(config).unwrap();

    for k in 1..=100 {
        cache.lookup(id(k * 8));
    }
    assert_eq!(cache.len(), 100);
    assert_eq!(cache.log_size(), 4);

    let retunes = cache.profile().retunes;
    for k in 1..=100 {
        cache.lookup(id(k * 8));
    }
    assert_eq!(cache.profile().retunes, retunes);
}
