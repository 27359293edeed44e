//! # DriverScope Core
//!
//! Instrumentation logic for database driver sessions.
//!
//! This crate contains:
//! - The [`MetricsBackend`] port and scoped timer contexts
//! - The metric definition registry
//! - Failure classification
//! - The [`MetricsManager`] facade and the completion binder
//!
//! ## Architecture Principles
//! - Only depends on `driverscope-common` and `driverscope-domain`
//! - No exporter or runtime wiring; backends live in `driverscope-infra`
//! - A disabled manager costs one branch per call

pub mod classifier;
pub mod completion;
pub mod manager;
pub mod ports;
pub mod registry;
pub mod timer;

pub use classifier::{classify, classify_any};
pub use completion::{CompletionSourceWithMetrics, CompletionState, MetricsCompletion};
pub use manager::MetricsManager;
pub use ports::{GaugeProvider, MetricsBackend, TimerHandle};
pub use registry::MetricsRegistry;
pub use timer::ScopedTimerContext;
