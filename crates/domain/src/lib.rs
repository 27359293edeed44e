//! # DriverScope Domain
//!
//! Types shared by the instrumentation core and its backends.
//!
//! This crate contains:
//! - Metric descriptors and the fixed metric identifiers
//! - The driver failure taxonomy
//! - Error types and Result definitions
//! - Configuration structures and defaults
//!
//! ## Architecture
//! - Depends only on `driverscope-common` foundation types
//! - No I/O, no runtime, no global state

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
