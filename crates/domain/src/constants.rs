//! Driver metrics constants
//!
//! Metric identifiers themselves live on the id enums in [`crate::types::ids`].

// Request context sentinels
pub const UNDEFINED_KEYSPACE: &str = "undefined-keyspace";
pub const UNDEFINED_TABLE: &str = "undefined-table";
pub const CONTEXT_SEPARATOR: char = '.';

// Configuration defaults
pub const DEFAULT_METRICS_NAMESPACE: &str = "driver";
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_LOG_FILTER: &str = "info";
/// Histogram buckets for timers, in milliseconds
pub const DEFAULT_TIMER_BUCKETS_MS: &[f64] =
    &[0.5, 1.0, 2.5, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1_000.0, 2_500.0, 5_000.0];

// Environment variables
pub const ENV_METRICS_ENABLED: &str = "DRIVERSCOPE_METRICS_ENABLED";
pub const ENV_METRICS_BACKEND: &str = "DRIVERSCOPE_METRICS_BACKEND";
pub const ENV_METRICS_NAMESPACE: &str = "DRIVERSCOPE_METRICS_NAMESPACE";
pub const ENV_METRICS_SAMPLE_INTERVAL_MS: &str = "DRIVERSCOPE_METRICS_SAMPLE_INTERVAL_MS";
pub const ENV_LOG_FILTER: &str = "DRIVERSCOPE_LOG_FILTER";
pub const ENV_LOG_JSON: &str = "DRIVERSCOPE_LOG_JSON";
