//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for DriverScope
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum DriverScopeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Fault raised by a metrics backend
///
/// These never reach the caller of an instrumented operation; the manager
/// logs and drops them.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricsError {
    #[error("Failed to register metric {metric}: {reason}")]
    Registration { metric: String, reason: String },

    #[error("Backend error: {0}")]
    Backend(String),
}

impl MetricsError {
    pub fn registration(metric: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Registration { metric: metric.into(), reason: reason.to_string() }
    }
}

/// Result type alias for DriverScope operations
pub type Result<T> = std::result::Result<T, DriverScopeError>;

/// Result type alias for backend operations
pub type MetricsResult<T> = std::result::Result<T, MetricsError>;
