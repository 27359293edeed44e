//! Configuration structures

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LOG_FILTER, DEFAULT_METRICS_NAMESPACE, DEFAULT_SAMPLE_INTERVAL_MS,
    DEFAULT_TIMER_BUCKETS_MS,
};
use crate::errors::{DriverScopeError, Result};
use crate::impl_domain_name_conversions;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.metrics.validate()
    }
}

/// Backend selected when metrics are enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Prometheus,
    Memory,
}

impl_domain_name_conversions!(BackendKind {
    Prometheus => "prometheus",
    Memory => "memory",
});

/// Metrics collection settings
///
/// Collection is off unless `enabled` is set; a disabled configuration never
/// constructs a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub backend: BackendKind,
    /// Prefix for exported series names
    pub namespace: String,
    /// How often pull gauges are sampled
    pub sample_interval_ms: u64,
    /// Histogram bucket bounds for timers, ascending, in milliseconds
    pub timer_buckets_ms: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            backend: BackendKind::default(),
            namespace: DEFAULT_METRICS_NAMESPACE.to_string(),
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            timer_buckets_ms: DEFAULT_TIMER_BUCKETS_MS.to_vec(),
        }
    }
}

impl MetricsConfig {
    /// Check the settings a backend relies on
    ///
    /// # Errors
    /// Returns `DriverScopeError::Config` for an invalid namespace, a zero
    /// sample interval or unsorted/empty buckets.
    pub fn validate(&self) -> Result<()> {
        let valid_namespace = self
            .namespace
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && self.namespace.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_namespace {
            return Err(DriverScopeError::Config(format!(
                "Invalid metrics namespace: {:?}",
                self.namespace
            )));
        }

        if self.sample_interval_ms == 0 {
            return Err(DriverScopeError::Config(
                "Sample interval must be greater than zero".to_string(),
            ));
        }

        if self.timer_buckets_ms.is_empty() {
            return Err(DriverScopeError::Config("Timer buckets must not be empty".to_string()));
        }
        if self.timer_buckets_ms.windows(2).any(|w| w[0] >= w[1]) {
            return Err(DriverScopeError::Config(
                "Timer buckets must be strictly ascending".to_string(),
            ));
        }

        Ok(())
    }
}

/// Tracing subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: DEFAULT_LOG_FILTER.to_string(), json: false }
    }
}
