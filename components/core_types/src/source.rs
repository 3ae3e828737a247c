//! Call-site labels for cache diagnostics.
//!
//! A dispatch cache is usually owned by one dispatch site. The label records
//! where that site lives so reports from many caches can be told apart.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;

/// Source location of the code that owns a cache.
///
/// Labels are purely informational and never affect lookups.
///
/// # Examples
///
/// ```
/// use core_types::SourceLabel;
///
/// let label = SourceLabel::new("shapes.rs", 42);
/// assert_eq!(label.to_string(), "shapes.rs[42]");
///
/// let here = SourceLabel::here();
/// assert!(here.file.ends_with(".rs"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLabel {
    /// File in which the cache is instantiated
    pub file: String,
    /// Line in the file where it is instantiated
    pub line: u32,
    /// Column, when captured from a caller location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl SourceLabel {
    /// Create a label from an explicit file and line
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column: None,
        }
    }

    /// Label for the location of the caller
    #[track_caller]
    pub fn here() -> Self {
        Self::from(Location::caller())
    }
}

impl From<&Location<'_>> for SourceLabel {
    fn from(location: &Location<'_>) -> Self {
        Self {
            file: location.file().to_string(),
            line: location.line(),
            column: Some(location.column()),
        }
    }
}

impl fmt::Display for SourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.file, self.line)
    }
}
