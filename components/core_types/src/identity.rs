//! Type identities and the accessor that reads them from objects.
//!
//! A [`TypeIdentity`] is an opaque machine word that is stable for the
//! lifetime of the program and unique per dynamic type. Zero is never a
//! valid identity: caches use it to mark empty slots, so the type stores a
//! [`NonZeroUsize`] and the zero word is unrepresentable.

use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use crate::CacheError;

/// Opaque non-zero word identifying one dynamic type.
///
/// # Examples
///
/// ```
/// use core_types::TypeIdentity;
///
/// let id = TypeIdentity::new(0x40).unwrap();
/// assert_eq!(id.get(), 0x40);
/// assert!(TypeIdentity::new(0).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct TypeIdentity(NonZeroUsize);

impl TypeIdentity {
    /// Wrap a raw word, returning `None` for zero
    #[inline]
    pub const fn new(word: usize) -> Option<Self> {
        match NonZeroUsize::new(word) {
            Some(word) => Some(TypeIdentity(word)),
            None => None,
        }
    }

    /// Wrap a raw word that the host guarantees to be non-zero.
    ///
    /// # Panics
    ///
    /// Panics if `word` is zero; a zero identity would alias the empty-slot
    /// sentinel of every cache.
    #[inline]
    #[track_caller]
    pub fn from_word(word: usize) -> Self {
        match Self::new(word) {
            Some(identity) => identity,
            None => panic!("type identity must be non-zero"),
        }
    }

    /// Bit set in every identity derived from a [`TypeId`].
    ///
    /// Words passed to [`TypeIdentity::from_word`] should keep this bit
    /// clear when a cache mixes host identities with `dyn Any` ones;
    /// otherwise a host word may equal a hashed one.
    pub const TYPE_ID_TAG: usize = 1 << (usize::BITS - 1);

    const TYPE_ID_TAG_NONZERO: NonZeroUsize = match NonZeroUsize::new(Self::TYPE_ID_TAG) {
        Some(tag) => tag,
        None => panic!("type id tag must be non-zero"),
    };

    /// Identity derived from a Rust [`TypeId`].
    ///
    /// The hash of `id` is tagged with [`TypeIdentity::TYPE_ID_TAG`], so the
    /// result is never zero and never collides with an untagged host word.
    pub fn from_type_id(id: TypeId) -> Self {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        let word = hasher.finish() as usize;
        TypeIdentity(word | Self::TYPE_ID_TAG_NONZERO)
    }

    /// Identity of the static type `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::from_type_id(TypeId::of::<T>())
    }

    /// The raw word
    #[inline(always)]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<usize> for TypeIdentity {
    type Error = CacheError;

    fn try_from(word: usize) -> Result<Self, Self::Error> {
        Self::new(word).ok_or(CacheError::ZeroIdentity)
    }
}

impl From<TypeIdentity> for usize {
    fn from(identity: TypeIdentity) -> usize {
        identity.get()
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.get())
    }
}

/// Reads the dynamic type identity of a live object.
///
/// This is the capability a host supplies to a dispatch cache: given an
/// object, return the identity of its most-derived type. Implementations
/// must return the same identity for every object of one dynamic type and
/// different identities for different dynamic types.
///
/// # Examples
///
/// ```
/// use core_types::{HasTypeIdentity, TypeIdentity};
///
/// enum Shape { Circle, Square }
///
/// impl HasTypeIdentity for Shape {
///     fn type_identity(&self) -> TypeIdentity {
///         match self {
///             Shape::Circle => TypeIdentity::from_word(0x10),
///             Shape::Square => TypeIdentity::from_word(0x20),
///         }
///     }
/// }
///
/// assert_eq!(Shape::Square.type_identity().get(), 0x20);
/// ```
pub trait HasTypeIdentity {
    /// Identity of this object's dynamic type
    fn type_identity(&self) -> TypeIdentity;
}

impl HasTypeIdentity for dyn Any {
    fn type_identity(&self) -> TypeIdentity {
        TypeIdentity::from_type_id(self.type_id())
    }
}

impl HasTypeIdentity for dyn Any + Send {
    fn type_identity(&self) -> TypeIdentity {
        TypeIdentity::from_type_id(self.type_id())
    }
}

impl HasTypeIdentity for dyn Any + Send + Sync {
    fn type_identity(&self) -> TypeIdentity {
        TypeIdentity::from_type_id(self.type_id())
    }
}
