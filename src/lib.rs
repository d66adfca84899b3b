//! imgserver - An HTTP thumbnail server
//!
//! Renders source images at requested sizes and keeps the results in a
//! byte-bounded cache invalidated by source modification time.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod geometry;
pub mod imaging;
pub mod models;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_sweep_task;
