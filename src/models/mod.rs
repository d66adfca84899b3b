//! Models Module
//!
//! Query DTOs and JSON response bodies for the HTTP API.

pub mod requests;
pub mod responses;

pub use requests::{ImageQuery, ListQuery};
pub use responses::{CopyResponse, DeleteResponse, StatsResponse, StoredResponse};
