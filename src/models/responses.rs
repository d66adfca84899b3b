//! Response DTOs for the image server API
//!
//! Defines the structure of outgoing JSON response bodies. Rendered images
//! are returned as raw `image/jpeg` bodies, not through these types.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::geometry::Size;

/// Response body for the upload operation (POST /:name)
#[derive(Debug, Clone, Serialize)]
pub struct StoredResponse {
    /// Success message
    pub message: String,
    /// Stored source name
    pub name: String,
    /// Decoded width in pixels
    pub width: u32,
    /// Decoded height in pixels
    pub height: u32,
    /// Size of the normalized file in bytes
    pub bytes: usize,
}

impl StoredResponse {
    /// Creates a new StoredResponse
    pub fn new(name: impl Into<String>, size: Size, bytes: usize) -> Self {
        let name = name.into();
        Self {
            message: format!("Image '{}' stored successfully", name),
            name,
            width: size.width,
            height: size.height,
            bytes,
        }
    }
}

/// Response body for the DELETE operation (DELETE /:name)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The image that was deleted
    pub name: String,
    /// Number of cached renditions dropped with it
    pub purged: usize,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(name: impl Into<String>, purged: usize) -> Self {
        let name = name.into();
        Self {
            message: format!("Image '{}' deleted successfully", name),
            name,
            purged,
        }
    }
}

/// Response body for the copy operation (PUT /:src/:dst)
#[derive(Debug, Clone, Serialize)]
pub struct CopyResponse {
    /// Success message
    pub message: String,
    /// Copied from
    pub source: String,
    /// Copied to
    pub destination: String,
}

impl CopyResponse {
    /// Creates a new CopyResponse
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        let source = source.into();
        let destination = destination.into();
        Self {
            message: format!("Image '{}' copied to '{}'", source, destination),
            source,
            destination,
        }
    }
}

/// Response body for the stats endpoint (PUT /)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cached renditions
    pub items: usize,
    /// Bytes held by the cache
    pub size: u64,
    /// Configured capacity in bytes
    pub capacity: u64,
    /// Number of lookups
    pub gets: u64,
    /// Number of stores
    pub puts: u64,
    /// Number of lookups served from cache
    pub hits: u64,
    /// Number of evictions
    pub prunes: u64,
    /// Hit rate (hits / gets)
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(stats: &CacheStats, capacity: u64) -> Self {
        Self {
            items: stats.items,
            size: stats.size,
            capacity,
            gets: stats.gets,
            puts: stats.puts,
            hits: stats.hits,
            prunes: stats.prunes,
            hit_rate: stats.hit_rate(),
        }
    }
}
