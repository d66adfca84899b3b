//! Error types for the image server
//!
//! Provides unified error handling using thiserror. Each layer has its own
//! error enum; `ServerError` is the HTTP-facing one the handlers return.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Storage Error Enum ==
/// Errors raised by the image directory.
#[derive(Error, Debug)]
pub enum StorageError {
    /// No source image under that name
    #[error("Image not found: {0}")]
    NotFound(String),

    /// Name cannot be mapped to a file inside the base directory
    #[error("Invalid image name: {0:?}")]
    InvalidName(String),

    /// Underlying filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// == Codec Error Enum ==
/// Errors raised while decoding, resampling or encoding pixels.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Input bytes are not a supported image
    #[error("Failed to decode image: {message}")]
    Decode { message: String },

    /// Encoder rejected the pixel buffer
    #[error("Failed to encode image: {message}")]
    Encode { message: String },

    /// Rendering was interrupted before producing output
    #[error("Render task failed: {0}")]
    Task(String),
}

// == Cache Error Enum ==
/// Errors raised by the byte cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Eviction ran out of candidates before enough room was freed
    #[error("Cannot admit {key}: {needed} more bytes required but no entry can be evicted")]
    CannotAdmit { key: String, needed: u64 },
}

// == Server Error Enum ==
/// Unified error type for the HTTP layer.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Source image not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ServerError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) => ServerError::NotFound(name),
            StorageError::InvalidName(_) => ServerError::InvalidRequest(err.to_string()),
            StorageError::Io(_) => ServerError::Internal(err.to_string()),
        }
    }
}

impl From<CodecError> for ServerError {
    fn from(err: CodecError) -> Self {
        ServerError::Internal(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ServerError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP layer.
pub type Result<T> = std::result::Result<T, ServerError>;
