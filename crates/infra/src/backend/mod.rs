//! Metrics backend adapters

pub mod memory;
pub mod prometheus;

pub use memory::{InMemoryBackend, MetricsSnapshot, TimerStats};
pub use self::prometheus::{export_name, PrometheusBackend};

/// Backend holding pull gauges that must be sampled periodically
pub trait GaugeSampling: Send + Sync {
    /// Call every registered provider and publish its value
    ///
    /// Returns the number of gauges sampled.
    fn sample_gauges(&self) -> usize;
}
