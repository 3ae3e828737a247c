//! Dispatch cache behind a mutex, for sites reached from several threads.

use core_types::{CacheResult, TypeIdentity};
use parking_lot::{Mutex, MutexGuard};

use crate::config::CacheConfig;
use crate::dispatch::DispatchCache;
use crate::report::CacheReport;

/// A [`DispatchCache`] guarded by a [`parking_lot::Mutex`].
///
/// Every access takes the lock for the duration of one closure, so a
/// retune triggered by one thread never overlaps a lookup of another.
///
/// ```
/// use std::sync::Arc;
/// use type_cache::SharedDispatchCache;
/// use core_types::TypeIdentity;
///
/// let cache = Arc::new(SharedDispatchCache::<u64>::new());
/// let id = TypeIdentity::from_word(0x4000);
///
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let cache = Arc::clone(&cache);
///         std::thread::spawn(move || cache.with(id, |count| *count += 1))
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// assert_eq!(cache.with(id, |count| *count), 4);
/// ```
#[derive(Debug)]
pub struct SharedDispatchCache<V> {
    inner: Mutex<DispatchCache<V>>,
}

impl<V> SharedDispatchCache<V> {
    /// Create with the default configuration
    pub fn new() -> Self {
        Self::from_cache(DispatchCache::new())
    }

    /// Create from an explicit configuration
    pub fn with_config(config: CacheConfig) -> CacheResult<Self> {
        DispatchCache::with_config(config).map(Self::from_cache)
    }

    /// Wrap an existing cache
    pub fn from_cache(cache: DispatchCache<V>) -> Self {
        Self {
            inner: Mutex::new(cache),
        }
    }

    /// Run `f` on the value of `identity`, default-constructed on first sight
    pub fn with<R>(&self, identity: TypeIdentity, f: impl FnOnce(&mut V) -> R) -> R
    where
        V: Default,
    {
        f(self.inner.lock().lookup(identity))
    }

    /// Run `f` on the value of `identity`, built by `make` on first sight
    pub fn with_or_insert_with<R>(
        &self,
        identity: TypeIdentity,
        make: impl FnOnce() -> V,
        f: impl FnOnce(&mut V) -> R,
    ) -> R {
        f(self.inner.lock().lookup_or_insert_with(identity, make))
    }

    /// Number of distinct identities
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether no identity was looked up yet
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Diagnostic snapshot taken under the lock
    pub fn report(&self) -> CacheReport {
        self.inner.lock().report()
    }

    /// Hold the lock for a batch of operations
    pub fn lock(&self) -> MutexGuard<'_, DispatchCache<V>> {
        self.inner.lock()
    }

    /// Unwrap the inner cache
    pub fn into_inner(self) -> DispatchCache<V> {
        self.inner.into_inner()
    }
}

impl<V> Default for SharedDispatchCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> From<DispatchCache<V>> for SharedDispatchCache<V> {
    fn from(cache: DispatchCache<V>) -> Self {
        Self::from_cache(cache)
    }
}
