//! Outbound port to a metrics backend
//!
//! The core never stores metric values itself. Every observation is handed to
//! a [`MetricsBackend`] which owns its own synchronisation.

use std::sync::Arc;
use std::time::Duration;

use driverscope_domain::{MetricSpec, MetricsResult};

/// Pull callback sampled by the backend on its own schedule
pub type GaugeProvider = Arc<dyn Fn() -> f64 + Send + Sync>;

/// Backend that records timers, counters and gauges
///
/// Implementations must be internally thread-safe; the manager calls them
/// from arbitrary tasks without locking. Registering the same
/// `(name, context)` pair twice must resolve to the same series.
pub trait MetricsBackend: Send + Sync {
    /// Register (or replace) the provider behind a pull gauge
    fn set_gauge(&self, spec: &MetricSpec, provider: GaugeProvider) -> MetricsResult<()>;

    /// Increment a counter by one
    fn increment(&self, spec: &MetricSpec) -> MetricsResult<()>;

    /// Begin timing one occurrence of `spec`
    fn time(&self, spec: &MetricSpec) -> MetricsResult<Box<dyn TimerHandle>>;
}

/// Running measurement handed out by [`MetricsBackend::time`]
///
/// Dropping a handle without calling [`TimerHandle::stop`] must not record a
/// sample.
pub trait TimerHandle: Send {
    /// Record the elapsed duration
    fn stop(self: Box<Self>);

    /// Time elapsed since the handle was created
    fn elapsed(&self) -> Duration;
}
