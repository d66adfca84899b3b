//! Cache Key Module
//!
//! Composite keys for rendered thumbnails.
//!
//! A key renders as `{source}/{width}x{height}`. Source names never contain
//! `/` (the directory rejects them), so the first `/` always separates the
//! source from the geometry and `{source}/` is an exact per-source prefix.

use std::fmt;

// == Key Separator ==
/// Separates the source name from the requested geometry.
pub const KEY_SEPARATOR: char = '/';

// == Cache Key ==
/// Identifies one rendered variant of one source image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Source image name
    pub source: String,
    /// Requested width (0 = unconstrained)
    pub width: u32,
    /// Requested height (0 = unconstrained)
    pub height: u32,
}

impl CacheKey {
    // == Constructor ==
    /// Creates a key for a source and requested geometry.
    pub fn new(source: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            source: source.into(),
            width,
            height,
        }
    }

    // == Source Prefix ==
    /// Returns the prefix shared by every key derived from `source`.
    pub fn source_prefix(source: &str) -> String {
        format!("{}{}", source, KEY_SEPARATOR)
    }

    // == Source Of ==
    /// Extracts the source name from a rendered key.
    pub fn source_of(key: &str) -> Option<&str> {
        key.split_once(KEY_SEPARATOR).map(|(source, _)| source)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}x{}",
            self.source, KEY_SEPARATOR, self.width, self.height
        )
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.to_string()
    }
}
