//! Authoritative identity → value table.
//!
//! The table owns every value ever created by a cache. It only grows: an
//! identity is inserted once and never removed. Entries are addressed by
//! their insertion position, which stays valid for the life of the table,
//! so the slot cache can refer to entries by index without ever holding a
//! pointer into storage that may reallocate.

use core_types::TypeIdentity;
use indexmap::IndexMap;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    hits: u64,
}

/// Growth-only map from type identity to value
#[derive(Debug, Clone)]
pub struct TypeTable<V> {
    entries: IndexMap<TypeIdentity, Entry<V>>,
}

impl<V> TypeTable<V> {
    /// Create an empty table
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty table with room for `capacity` identities
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Number of distinct identities
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no identity was inserted yet
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry index of `identity`, if present
    #[inline]
    pub fn find(&self, identity: TypeIdentity) -> Option<usize> {
        self.entries.get_index_of(&identity)
    }

    /// Value of `identity`, if present
    pub fn get(&self, identity: TypeIdentity) -> Option<&V> {
        self.entries.get(&identity).map(|entry| &entry.value)
    }

    /// Hit count of `identity`, if present
    pub fn hits(&self, identity: TypeIdentity) -> Option<u64> {
        self.entries.get(&identity).map(|entry| entry.hits)
    }

    /// Insert a new identity and return its entry index.
    ///
    /// The identity must be absent; callers check with [`find`](Self::find).
    pub fn insert(&mut self, identity: TypeIdentity, value: V) -> usize {
        debug_assert!(!self.entries.contains_key(&identity));
        let (index, _) = self.entries.insert_full(identity, Entry { value, hits: 0 });
        index
    }

    /// Insert a default value for a new identity
    pub fn insert_default(&mut self, identity: TypeIdentity) -> &mut V
    where
        V: Default,
    {
        let index = self.insert(identity, V::default());
        &mut self.entries[index].value
    }

    /// Value at `index`, counting one hit
    #[inline]
    pub fn touch(&mut self, index: usize) -> &mut V {
        let entry = &mut self.entries[index];
        entry.hits += 1;
        &mut entry.value
    }

    /// Identity at `index`
    pub fn identity_at(&self, index: usize) -> Option<TypeIdentity> {
        self.entries.get_index(index).map(|(identity, _)| *identity)
    }

    /// Identities in insertion order
    pub fn identities(&self) -> impl ExactSizeIterator<Item = TypeIdentity> + '_ {
        self.entries.keys().copied()
    }

    /// `(identity, value)` pairs in insertion order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (TypeIdentity, &V)> + '_ {
        self.entries
            .iter()
            .map(|(identity, entry)| (*identity, &entry.value))
    }

    /// `(identity, value)` pairs in insertion order, values mutable
    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = (TypeIdentity, &mut V)> + '_ {
        self.entries
            .iter_mut()
            .map(|(identity, entry)| (*identity, &mut entry.value))
    }
}

impl<V> Default for TypeTable<V> {
    fn default() -> Self {
        Self::new()
    }
}
