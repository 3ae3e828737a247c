//! Error types for cache construction and identity conversion.
//!
//! Lookups themselves never fail; only building a cache from an invalid
//! configuration or converting a raw zero word into an identity does.

use thiserror::Error;

/// Errors reported while configuring a cache or converting identities.
///
/// # Examples
///
/// ```
/// use core_types::{CacheError, TypeIdentity};
///
/// let err = TypeIdentity::try_from(0usize).unwrap_err();
/// assert_eq!(err, CacheError::ZeroIdentity);
/// assert_eq!(err.to_string(), "type identity must be non-zero");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// A raw identity word was zero, which is reserved for empty slots
    #[error("type identity must be non-zero")]
    ZeroIdentity,
    /// The expected population hint was zero
    #[error("expected population must be at least 1, got {0}")]
    InvalidExpectedSize(usize),
    /// The maximum log size is outside the supported range
    #[error("max log size must be within 1..={max}, got {got}")]
    InvalidMaxLogSize {
        /// Requested maximum log size
        got: u32,
        /// Largest supported maximum log size
        max: u32,
    },
    /// The collision budget was zero
    #[error("collision budget must be at least 1")]
    InvalidCollisionBudget,
}

/// Result type for cache construction
pub type CacheResult<T> = Result<T, CacheError>;
