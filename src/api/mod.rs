//! API Module
//!
//! HTTP handlers and routing for the image server.
//!
//! # Endpoints
//! - `GET /:name?width=W&height=H` - Render a thumbnail
//! - `POST /:name` - Upload a source image
//! - `DELETE /:name` - Delete a source image
//! - `PUT /:src/:dst` - Copy a source image
//! - `GET /?age=S` - List source images
//! - `PUT /` - Get cache statistics

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
