//! Unit tests for type_cache components

use core_types::{CacheError, SourceLabel, TypeIdentity};
use type_cache::{
    CacheConfig, DispatchCache, SlotCache, Tuner, TypeTable, DEFAULT_COLLISION_BUDGET,
    FRAGILE_COLLISION_BUDGET,
};

fn id(word: usize) -> TypeIdentity {
    TypeIdentity::from_word(word)
}

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_default_cache_has_eight_slots() {
    let cache: DispatchCache<u8> = DispatchCache::new();
    assert_eq!(cache.capacity(), 8);
    assert_eq!(cache.log_size(), 3);
    assert_eq!(cache.shift(), 0);
    assert!(cache.is_empty());
}

#[test]
fn test_expected_size_zero_is_treated_as_one() {
    let cache: DispatchCache<u8> = DispatchCache::with_expected_size(0);
    assert_eq!(cache.capacity(), 1);
}

#[test]
fn test_with_config_rejects_invalid() {
    let result = DispatchCache::<u8>::with_config(CacheConfig::default().with_expected_size(0));
    assert!(matches!(result, Err(CacheError::InvalidExpectedSize(0))));

    let result = DispatchCache::<u8>::with_config(CacheConfig::default().with_collision_budget(0));
    assert!(matches!(result, Err(CacheError::InvalidCollisionBudget)));
}

#[test]
fn test_with_config_clamps_initial_size() {
    let config = CacheConfig::default()
        .with_expected_size(4096)
        .with_max_log_size(6);
    let cache: DispatchCache<u8> = DispatchCache::with_config(config).unwrap();
    assert_eq!(cache.log_size(), 6);
}

#[test]
fn test_huge_expected_size_is_only_a_hint() {
    let config = CacheConfig::default().with_expected_size(usize::MAX);
    assert!(config.validate().is_ok());

    let mut cache: DispatchCache<u8> = DispatchCache::with_config(config).unwrap();
    assert_eq!(cache.log_size(), 16);
    assert_eq!(cache.capacity(), 1 << 16);
    *cache.lookup(id(0x40)) = 7;
    assert_eq!(cache.get(id(0x40)), Some(&7));

    let cache: DispatchCache<u8> = DispatchCache::with_expected_size(usize::MAX);
    assert_eq!(cache.log_size(), 16);
    assert!(cache.is_empty());
}

#[test]
fn test_config_from_json_fills_defaults() {
    let config: CacheConfig = serde_json::from_str(r#"{"expected_size": 64}"#).unwrap();
    assert_eq!(config.expected_size, 64);
    assert_eq!(config.collision_budget, DEFAULT_COLLISION_BUDGET);
    assert!(config.label.is_none());
}

// ============================================================================
// Lookup Tests
// ============================================================================

#[test]
fn test_lookup_returns_same_value() {
    let mut cache: DispatchCache<Vec<&str>> = DispatchCache::new();
    cache.lookup(id(0x1000)).push("first");
    cache.lookup(id(0x1000)).push("second");

    assert_eq!(cache.get(id(0x1000)), Some(&vec!["first", "second"]));
}

#[test]
fn test_lookup_or_insert_with_runs_once() {
    let mut cache = DispatchCache::new();
    let mut calls = 0;
    for _ in 0..4 {
        cache.lookup_or_insert_with(id(0x2000), || {
            calls += 1;
            "handler"
        });
    }
    assert_eq!(calls, 1);
    assert_eq!(cache.get(id(0x2000)), Some(&"handler"));
}

#[test]
fn test_try_lookup_error_then_success() {
    let mut cache: DispatchCache<u32> = DispatchCache::new();

    let failed = cache.try_lookup_or_insert_with(id(0x3000), || Err::<u32, _>("unsupported"));
    assert_eq!(failed.err(), Some("unsupported"));
    assert!(!cache.contains(id(0x3000)));

    let value = cache
        .try_lookup_or_insert_with(id(0x3000), || Ok::<_, &str>(7))
        .unwrap();
    assert_eq!(*value, 7);
    assert!(cache.contains(id(0x3000)));
}

#[test]
fn test_lookup_for_dyn_any() {
    use std::any::Any;

    let values: [&dyn Any; 4] = [&1u8, &2u16, &3u8, &"text"];
    let mut counts: DispatchCache<usize> = DispatchCache::new();
    for value in values {
        *counts.lookup_for(value) += 1;
    }

    assert_eq!(counts.len(), 3);
    assert_eq!(counts.get(TypeIdentity::of::<u8>()), Some(&2));
    assert_eq!(counts.get(TypeIdentity::of::<&str>()), Some(&1));
}

#[test]
fn test_hits_count_every_returned_value() {
    let mut cache: DispatchCache<()> = DispatchCache::new();
    for _ in 0..5 {
        cache.lookup(id(0x40));
    }
    assert_eq!(cache.hits(id(0x40)), Some(5));
    assert_eq!(cache.hits(id(0x80)), None);
}

#[test]
fn test_iter_in_first_seen_order() {
    let mut cache: DispatchCache<u8> = DispatchCache::new();
    for word in [0x500, 0x100, 0x300] {
        cache.lookup(id(word));
    }
    let order: Vec<usize> = cache.iter().map(|(identity, _)| identity.get()).collect();
    assert_eq!(order, vec![0x500, 0x100, 0x300]);
}

#[test]
fn test_iter_mut_updates_values() {
    let mut cache: DispatchCache<u8> = DispatchCache::new();
    cache.lookup(id(0x10));
    cache.lookup(id(0x20));
    for (_, value) in cache.iter_mut() {
        *value = 9;
    }
    assert!(cache.iter().all(|(_, value)| *value == 9));
}

// ============================================================================
// Profile Tests
// ============================================================================

#[test]
fn test_profile_counts_hits_and_misses() {
    let mut cache: DispatchCache<()> = DispatchCache::new();
    cache.lookup(id(0x100));
    cache.lookup(id(0x100));
    cache.lookup(id(0x100));

    let profile = cache.profile();
    assert_eq!(profile.lookups, 3);
    assert_eq!(profile.hits, 2);
    assert_eq!(profile.misses, 1);
    assert_eq!(profile.insertions, 1);
    assert_eq!(profile.collisions, 0);
}

#[test]
fn test_profile_counts_collisions_and_retunes() {
    let mut cache: DispatchCache<()> = DispatchCache::with_expected_size(2);
    cache.lookup(id(0x10));
    cache.lookup(id(0x20));

    let profile = cache.profile();
    assert_eq!(profile.collisions, 1);
    assert_eq!(profile.retunes, 1);
}

// ============================================================================
// Collision Budget Tests
// ============================================================================

#[test]
fn test_budget_after_collision_free_retune() {
    let mut cache: DispatchCache<()> = DispatchCache::with_expected_size(2);
    cache.lookup(id(0x10));
    cache.lookup(id(0x20));

    assert_eq!(cache.shift(), 5);
    assert_eq!(cache.collision_budget(), FRAGILE_COLLISION_BUDGET);
}

#[test]
fn test_budget_after_crowded_retune() {
    let config = CacheConfig::default()
        .with_expected_size(2)
        .with_max_log_size(1);
    let mut cache: DispatchCache<()> = DispatchCache::with_config(config).unwrap();

    cache.lookup(id(0x10));
    cache.lookup(id(0x20)); // retune: collision-free at shift 5
    cache.lookup(id(0x30)); // displaces 0x20 without a retune
    cache.lookup(id(0x40)); // retune: four identities on two slots

    assert_eq!(cache.profile().retunes, 2);
    assert_eq!(cache.capacity(), 2);
    assert_eq!(cache.shift(), 5);
    assert_eq!(cache.collision_budget(), DEFAULT_COLLISION_BUDGET);
}

#[test]
fn test_custom_budget_is_used_after_crowded_retune() {
    let config = CacheConfig::default()
        .with_expected_size(2)
        .with_max_log_size(1)
        .with_collision_budget(9);
    let mut cache: DispatchCache<()> = DispatchCache::with_config(config).unwrap();
    for word in [0x10, 0x20, 0x30, 0x40] {
        cache.lookup(id(word));
    }
    assert_eq!(cache.collision_budget(), 9);
}

#[test]
fn test_revisits_do_not_retune() {
    let config = CacheConfig::default()
        .with_expected_size(2)
        .with_max_log_size(1);
    let mut cache: DispatchCache<()> = DispatchCache::with_config(config).unwrap();
    for word in [0x10, 0x20, 0x30, 0x40] {
        cache.lookup(id(word));
    }
    let retunes = cache.profile().retunes;

    for _ in 0..10 {
        for word in [0x10, 0x20, 0x30, 0x40] {
            cache.lookup(id(word));
        }
    }

    assert_eq!(cache.profile().retunes, retunes);
    assert_eq!(cache.len(), 4);
}

// ============================================================================
// Rehash Tests
// ============================================================================

#[test]
fn test_rehash_on_empty_cache() {
    let mut cache: DispatchCache<()> = DispatchCache::new();
    let choice = cache.rehash();
    assert_eq!(choice.stats.total, 0);
    assert_eq!(cache.capacity(), 8);
    assert_eq!(cache.profile().retunes, 1);
}

#[test]
fn test_rehash_never_shrinks() {
    let mut cache: DispatchCache<()> = DispatchCache::with_expected_size(1024);
    cache.lookup(id(0x10));
    cache.lookup(id(0x20));
    cache.rehash();
    assert_eq!(cache.capacity(), 1024);
}

#[test]
fn test_rehash_keeps_values() {
    let mut cache: DispatchCache<usize> = DispatchCache::with_expected_size(2);
    for word in [0x110, 0x120, 0x140, 0x180] {
        *cache.lookup(id(word)) = word;
    }
    cache.rehash();
    for word in [0x110, 0x120, 0x140, 0x180] {
        assert_eq!(*cache.lookup(id(word)), word);
    }
}

// ============================================================================
// Label Tests
// ============================================================================

#[test]
fn test_label_reaches_report() {
    let config = CacheConfig::default().with_label(SourceLabel::new("shapes.rs", 42));
    let cache: DispatchCache<()> = DispatchCache::with_config(config).unwrap();

    let report = cache.report();
    assert_eq!(report.label, Some(SourceLabel::new("shapes.rs", 42)));
    assert!(report.to_string().starts_with("shapes.rs[42]"));
}

// ============================================================================
// Building Block Tests
// ============================================================================

#[test]
fn test_table_and_slots_together() {
    let mut table = TypeTable::new();
    let mut slots = SlotCache::new(2);

    for word in [0x100, 0x200, 0x300] {
        let entry = table.insert(id(word), word);
        let index = slots.index_of(id(word));
        slots.publish(index, id(word), entry);
    }
    // all three share slot 0 at shift 0
    assert_eq!(slots.occupied(), 1);

    let mut tuner = Tuner::new(table.identities(), 16);
    let choice = tuner.search(slots.log_size(), slots.shift());
    slots.rebuild(choice.log_size, choice.shift, table.identities().enumerate());

    assert!(choice.stats.is_collision_free());
    assert_eq!(slots.occupied(), 3);
    for word in [0x100, 0x200, 0x300] {
        let entry = slots.probe(id(word)).unwrap();
        assert_eq!(*table.touch(entry), word);
    }
}
