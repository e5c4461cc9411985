//! Vid2Vert Common Utilities
//!
//! Shared infrastructure for all Vid2Vert crates:
//! - Error taxonomy and result alias
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
