//! Domain types for driver instrumentation

pub mod failure;
pub mod ids;
pub mod metric;
pub mod table;

pub use failure::DriverError;
pub use ids::{ErrorCounter, GaugeId, TimerId, REQUEST_TIMER_NAME};
pub use metric::{MeasurementUnit, MetricKind, MetricSpec, SeriesKey, TimeUnit};
pub use table::TableMeta;
