//! Store name type.
//!
//! `StoreName` is a newtype wrapper around `SmolStr` that gives type safety
//! to the generation-tagged names cache stores are registered under, such as
//! `climadillo-static-v1`.

use smol_str::SmolStr;
use std::borrow::Borrow;
use std::fmt;

/// The name a cache store is registered under.
///
/// Used for:
/// - Store lookup and deletion in the registry
/// - Response source tracking (`ResponseSource::Cache`)
/// - Generation checks during activation
///
/// # Example
/// ```
/// use offbox_core::StoreName;
///
/// let name = StoreName::generation("climadillo", "static", "v1");
/// assert_eq!(name.as_str(), "climadillo-static-v1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreName(SmolStr);

impl StoreName {
    /// Creates a new store name.
    #[inline]
    pub fn new(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    /// Creates a store name from a static string (no allocation).
    #[inline]
    pub const fn new_static(s: &'static str) -> Self {
        Self(SmolStr::new_static(s))
    }

    /// Builds a generation name: `{prefix}-{role}-{version}`.
    pub fn generation(prefix: &str, role: &str, version: &str) -> Self {
        Self(SmolStr::from(format!("{prefix}-{role}-{version}")))
    }

    /// Returns the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Borrow<str> for StoreName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StoreName {
    #[inline]
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}

impl From<String> for StoreName {
    #[inline]
    fn from(s: String) -> Self {
        Self(SmolStr::from(s))
    }
}
