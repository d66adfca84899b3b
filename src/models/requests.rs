//! Request DTOs for the image server API
//!
//! Defines the query strings accepted by the endpoints.

use serde::Deserialize;

/// Query for the image endpoint (GET /:name)
///
/// # Fields
/// - `width`: Requested width in pixels, 0 or absent = unconstrained
/// - `height`: Requested height in pixels, 0 or absent = unconstrained
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ImageQuery {
    /// Requested width
    #[serde(default)]
    pub width: u32,
    /// Requested height
    #[serde(default)]
    pub height: u32,
}

impl ImageQuery {
    /// Validates the requested geometry against `max_dimension`
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self, max_dimension: u32) -> Option<String> {
        if self.width > max_dimension {
            return Some(format!(
                "Width {} exceeds maximum of {} pixels",
                self.width, max_dimension
            ));
        }
        if self.height > max_dimension {
            return Some(format!(
                "Height {} exceeds maximum of {} pixels",
                self.height, max_dimension
            ));
        }
        None
    }
}

/// Query for the listing endpoint (GET /)
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListQuery {
    /// Minimum age in seconds since last modification
    #[serde(default)]
    pub age: u64,
}
