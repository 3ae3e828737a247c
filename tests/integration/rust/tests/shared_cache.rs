//! Shared dispatch caches across threads

use std::sync::Arc;
use std::thread;

use core_types::HasTypeIdentity;
use integration_tests::tagged;
use type_cache::{CacheConfig, SharedDispatchCache};

#[test]
fn test_concurrent_counting() {
    let cache: Arc<SharedDispatchCache<u64>> = Arc::new(SharedDispatchCache::new());
    let objects = Arc::new(tagged::population(16, 64, 1600));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let objects = Arc::clone(&objects);
            thread::spawn(move || {
                for object in objects.iter() {
                    cache.with(object.type_identity(), |count| *count += 1);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), 16);
    let inner = Arc::try_unwrap(cache).unwrap().into_inner();
    assert!(inner.iter().all(|(_, count)| *count == 400));
    assert_eq!(inner.profile().lookups, 6400);
}

#[test]
fn test_shared_with_config_and_builder() {
    let cache = SharedDispatchCache::with_config(CacheConfig::default().with_expected_size(2)).unwrap();
    let objects = tagged::population(3, 32, 9);

    for object in &objects {
        cache.with_or_insert_with(
            object.type_identity(),
            || format!("{:#x}", object.descriptor),
            |name| assert!(name.starts_with("0x4")),
        );
    }

    assert_eq!(cache.len(), 3);
    assert_eq!(cache.report().total, 3);
}

#[test]
fn test_shared_rejects_invalid_config() {
    let result = SharedDispatchCache::<u8>::with_config(CacheConfig::default().with_max_log_size(40));
    assert!(result.is_err());
}
