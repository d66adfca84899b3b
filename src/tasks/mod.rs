//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Stale sweep: Drops cached thumbnails whose source changed or vanished

mod sweep;

pub use sweep::{spawn_sweep_task, sweep_stale};
