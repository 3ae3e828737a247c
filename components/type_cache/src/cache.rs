//! Direct-mapped slot array.
//!
//! Each slot remembers one identity and the table entry holding its value.
//! An identity lives in slot `(identity >> shift) & mask`; the slot count is
//! always a power of two. Slots never own values, they only point into the
//! table, so overwriting or clearing a slot loses nothing.

use core_types::TypeIdentity;

/// One cache line: the stored identity and its table entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slot {
    /// Identity stored in the slot, `None` when empty
    pub identity: Option<TypeIdentity>,
    /// Entry index in the table; meaningless when the slot is empty
    pub entry: usize,
}

/// Direct-mapped array of identity → entry slots
#[derive(Debug, Clone)]
pub struct SlotCache {
    slots: Vec<Slot>,
    mask: usize,
    shift: u32,
}

impl SlotCache {
    /// Empty cache with `2^log_size` slots and a shift of 0
    pub fn new(log_size: u32) -> Self {
        let len = 1usize << log_size;
        Self {
            slots: vec![Slot::default(); len],
            mask: len - 1,
            shift: 0,
        }
    }

    /// Slot index of `identity` under the current layout
    #[inline(always)]
    pub fn index_of(&self, identity: TypeIdentity) -> usize {
        (identity.get() >> self.shift) & self.mask
    }

    /// Entry index of `identity` if it occupies its slot
    #[inline]
    pub fn probe(&self, identity: TypeIdentity) -> Option<usize> {
        let slot = self.slots[self.index_of(identity)];
        (slot.identity == Some(identity)).then_some(slot.entry)
    }

    /// Slot at `index`
    #[inline]
    pub fn slot(&self, index: usize) -> Slot {
        self.slots[index]
    }

    /// Store `identity` at `index`, returning the identity it displaced
    #[inline]
    pub fn publish(&mut self, index: usize, identity: TypeIdentity, entry: usize) -> Option<TypeIdentity> {
        let slot = &mut self.slots[index];
        let displaced = slot.identity.filter(|old| *old != identity);
        *slot = Slot {
            identity: Some(identity),
            entry,
        };
        displaced
    }

    /// Switch to a new layout and repopulate every slot.
    ///
    /// Storage grows when `log_size` exceeds the current size and is reused
    /// otherwise; it never shrinks. Entries are published in iteration
    /// order, so when two entries share a slot the later one stays.
    pub fn rebuild<I>(&mut self, log_size: u32, shift: u32, entries: I)
    where
        I: IntoIterator<Item = (usize, TypeIdentity)>,
    {
        let len = 1usize << log_size;
        if len > self.slots.len() {
            tracing::trace!(from = self.slots.len(), to = len, "growing slot array");
            self.slots = vec![Slot::default(); len];
        } else {
            self.slots.fill(Slot::default());
        }
        self.mask = self.slots.len() - 1;
        self.shift = shift;

        for (entry, identity) in entries {
            let index = self.index_of(identity);
            self.slots[index] = Slot {
                identity: Some(identity),
                entry,
            };
        }
    }

    /// Number of slots
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false; a cache has at least one slot
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// log2 of the slot count
    #[inline]
    pub fn log_size(&self) -> u32 {
        self.slots.len().trailing_zeros()
    }

    /// Current right shift applied to identities
    #[inline]
    pub fn shift(&self) -> u32 {
        self.shift
    }

    /// Number of non-empty slots
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.identity.is_some()).count()
    }

    /// All slots in index order
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }
}
