//! # DriverScope Infrastructure
//!
//! Concrete implementations of the core metrics ports.
//!
//! This crate contains:
//! - Metrics backends (Prometheus registry, in-process memory)
//! - Periodic gauge sampling
//! - Configuration loading (environment, JSON, TOML)
//! - Tracing subscriber setup
//! - Runtime assembly from configuration
//!
//! ## Architecture
//! - Implements traits defined in `driverscope-core`
//! - Depends on `driverscope-domain` and `driverscope-core`
//! - Contains all "impure" code (I/O, background tasks, exporters)

pub mod backend;
pub mod bootstrap;
pub mod config;
pub mod logging;
pub mod sampler;

// Re-export commonly used items
pub use backend::{
    export_name, GaugeSampling, InMemoryBackend, MetricsSnapshot, PrometheusBackend, TimerStats,
};
pub use bootstrap::{build_metrics_runtime, MetricsExport, MetricsRuntime};
pub use logging::init_tracing;
pub use sampler::{GaugeSampler, SamplerError, SamplerResult};
