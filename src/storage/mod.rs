//! Storage Module
//!
//! Source image persistence behind the [`Directory`] trait.

mod directory;

pub use directory::{validate_name, Directory, FsDirectory};
