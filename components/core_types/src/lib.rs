//! Core types shared by the type-dispatch cache components.
//!
//! This crate provides the foundational vocabulary of the workspace:
//! how a dynamic type is identified, how errors are reported, how a cache
//! instance is labelled for diagnostics, and how lookups are profiled.
//!
//! # Overview
//!
//! - [`TypeIdentity`] - Opaque non-zero word identifying a dynamic type
//! - [`HasTypeIdentity`] - Host-supplied accessor from an object to its identity
//! - [`CacheError`] - Configuration and identity errors
//! - [`SourceLabel`] - Call-site label used in diagnostics
//! - [`LookupProfile`] - Aggregate lookup counters
//!
//! # Examples
//!
//! ```
//! use core_types::{HasTypeIdentity, TypeIdentity};
//! use std::any::Any;
//!
//! let circle: Box<dyn Any> = Box::new(1.5f64);
//! let square: Box<dyn Any> = Box::new(2u32);
//!
//! assert_eq!(circle.type_identity(), TypeIdentity::of::<f64>());
//! assert_ne!(circle.type_identity(), square.type_identity());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod identity;
mod profile;
mod source;

pub use error::{CacheError, CacheResult};
pub use identity::{HasTypeIdentity, TypeIdentity};
pub use profile::LookupProfile;
pub use source::SourceLabel;
