//! Failures surfaced by the driver's request layer
//!
//! Only the shape of a failure matters to instrumentation; the instrumented
//! operation always forwards the value to its caller unchanged.

use std::time::Duration;

use driverscope_common::error::{ErrorClassification, ErrorSeverity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single driver request
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum DriverError {
    /// Coordinator timed out waiting for replica write acknowledgements
    #[error("Write timeout at {consistency}: {received} of {required} replicas acknowledged")]
    WriteTimeout { consistency: String, received: u32, required: u32 },

    /// Coordinator timed out waiting for replica read responses
    #[error("Read timeout at {consistency}: {received} of {required} replicas responded")]
    ReadTimeout { consistency: String, received: u32, required: u32, data_present: bool },

    /// Client-side timeout; the host never answered
    #[error("Operation timed out on {host} after {timeout_ms}ms")]
    OperationTimedOut { host: String, timeout_ms: u64 },

    #[error("No host available: {tried} host(s) tried")]
    NoHostAvailable { tried: usize },

    /// Not enough live replicas to satisfy the consistency level
    #[error("Unavailable at {consistency}: {alive} alive, {required} required")]
    Unavailable { consistency: String, required: u32, alive: u32 },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Server overloaded: {0}")]
    Overloaded(String),

    /// Operation abandoned before it resolved
    #[error("Operation cancelled")]
    Cancelled,

    /// Failure raised outside the driver (user callbacks, I/O wrappers, ...)
    #[error("External error: {0}")]
    External(String),
}

impl DriverError {
    pub fn external(err: impl std::fmt::Display) -> Self {
        Self::External(err.to_string())
    }

    /// Whether the failure is any flavour of timeout
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::WriteTimeout { .. } | Self::ReadTimeout { .. } | Self::OperationTimedOut { .. }
        )
    }
}

impl ErrorClassification for DriverError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::WriteTimeout { .. }
            | Self::ReadTimeout { .. }
            | Self::OperationTimedOut { .. }
            | Self::NoHostAvailable { .. }
            | Self::Unavailable { .. }
            | Self::Overloaded(_) => true,
            Self::InvalidQuery(_)
            | Self::Authentication(_)
            | Self::Protocol(_)
            | Self::Cancelled
            | Self::External(_) => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::WriteTimeout { .. }
            | Self::ReadTimeout { .. }
            | Self::OperationTimedOut { .. }
            | Self::Unavailable { .. }
            | Self::Overloaded(_) => ErrorSeverity::Warning,
            Self::Cancelled => ErrorSeverity::Info,
            Self::InvalidQuery(_) | Self::External(_) => ErrorSeverity::Error,
            Self::NoHostAvailable { .. } | Self::Authentication(_) | Self::Protocol(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self.severity(), ErrorSeverity::Critical)
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Overloaded(_) => Some(Duration::from_millis(500)),
            Self::NoHostAvailable { .. } => Some(Duration::from_secs(1)),
            _ => None,
        }
    }
}
