//! Adaptive type-switch cache
//!
//! This crate maps dynamic type identities to per-type values (typically a
//! jump target or a handler) through a small direct-mapped cache that tunes
//! its own indexing function:
//! - A growth-only table holds every value ever created
//! - A power-of-two slot array answers repeated lookups with one shift,
//!   one mask and one comparison
//! - An entropy-driven tuner picks the slot count and the shift applied to
//!   identities so that the live population spreads over the slots
//! - A collision budget decides when a retune is worthwhile
//!
//! # Example
//!
//! ```
//! use std::any::Any;
//! use type_cache::DispatchCache;
//!
//! struct Circle;
//! struct Square;
//!
//! let shapes: Vec<Box<dyn Any>> = vec![Box::new(Circle), Box::new(Square), Box::new(Circle)];
//! let mut visits: DispatchCache<u32> = DispatchCache::new();
//!
//! for shape in &shapes {
//!     *visits.lookup_for(&**shape) += 1;
//! }
//!
//! assert_eq!(visits.len(), 2);
//! assert_eq!(visits.iter().map(|(_, n)| *n).sum::<u32>(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod bits;
pub mod cache;
pub mod config;
pub mod dispatch;
pub mod report;
pub mod shared;
pub mod table;
pub mod tuner;

// Re-export main types at crate root
pub use cache::{Slot, SlotCache};
pub use config::{
    CacheConfig, DEFAULT_COLLISION_BUDGET, DEFAULT_EXPECTED_SIZE, DEFAULT_MAX_LOG_SIZE,
    FRAGILE_COLLISION_BUDGET, MAX_LOG_SIZE_LIMIT,
};
pub use core_types::{CacheError, CacheResult, HasTypeIdentity, LookupProfile, SourceLabel, TypeIdentity};
pub use dispatch::DispatchCache;
pub use report::{CacheReport, ReportRow};
pub use shared::SharedDispatchCache;
pub use table::TypeTable;
pub use tuner::{Candidate, LayoutStats, Tuner};
