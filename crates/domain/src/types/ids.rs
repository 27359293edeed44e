//! Fixed metric identifiers
//!
//! The string forms below are the names dashboards are built on; they are
//! exported verbatim by every backend.

use serde::{Deserialize, Serialize};

use super::metric::MeasurementUnit;
use crate::impl_domain_name_conversions;

/// Timers that are not partitioned by request target
///
/// The per-table request timer is context-bearing and is obtained through
/// the registry's `request_timer` lookup instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerId {
    ClusterConnect,
    OpenConnection,
    WriteQueue,
    PendingRequest,
}

impl_domain_name_conversions!(TimerId {
    ClusterConnect => "cluster-connect-timer",
    OpenConnection => "open-connection-timer",
    WriteQueue => "write-queue-timer",
    PendingRequest => "pending-timer-options",
});

impl TimerId {
    pub const ALL: [Self; 4] =
        [Self::ClusterConnect, Self::OpenConnection, Self::WriteQueue, Self::PendingRequest];

    pub const fn unit(self) -> MeasurementUnit {
        match self {
            Self::ClusterConnect | Self::OpenConnection => MeasurementUnit::Connections,
            Self::WriteQueue | Self::PendingRequest => MeasurementUnit::Requests,
        }
    }
}

/// Name of the per-table request timer
pub const REQUEST_TIMER_NAME: &str = "request-timer";

/// Pull-based gauges sampled from session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GaugeId {
    KnownHosts,
    ConnectedSessions,
    ConnectedToHosts,
    OpenConnections,
    InFlightRequests,
    WriteQueueLength,
    FreeOperationsLength,
}

impl_domain_name_conversions!(GaugeId {
    KnownHosts => "known-hosts",
    ConnectedSessions => "connected-sessions",
    ConnectedToHosts => "connected-to-hosts",
    OpenConnections => "open-connections",
    InFlightRequests => "in-flight-requests",
    WriteQueueLength => "write-queue-length",
    FreeOperationsLength => "free-operations-length",
});

impl GaugeId {
    pub const ALL: [Self; 7] = [
        Self::KnownHosts,
        Self::ConnectedSessions,
        Self::ConnectedToHosts,
        Self::OpenConnections,
        Self::InFlightRequests,
        Self::WriteQueueLength,
        Self::FreeOperationsLength,
    ];

    pub const fn unit(self) -> MeasurementUnit {
        match self {
            Self::ConnectedSessions | Self::OpenConnections => MeasurementUnit::Connections,
            Self::InFlightRequests | Self::WriteQueueLength => MeasurementUnit::Requests,
            Self::KnownHosts | Self::ConnectedToHosts | Self::FreeOperationsLength => {
                MeasurementUnit::Items
            }
        }
    }
}

/// Error counters; every failure lands in exactly one of these
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCounter {
    NoHostAvailable,
    OperationTimedOut,
    WriteTimeout,
    ReadTimeout,
    Unavailable,
    Other,
}

impl_domain_name_conversions!(ErrorCounter {
    NoHostAvailable => "no-host-available-error",
    OperationTimedOut => "operation-time-out-errors",
    WriteTimeout => "write-time-out-errors",
    ReadTimeout => "read-time-out-errors",
    Unavailable => "unavailable-errors",
    Other => "other-errors",
});

impl ErrorCounter {
    pub const ALL: [Self; 6] = [
        Self::NoHostAvailable,
        Self::OperationTimedOut,
        Self::WriteTimeout,
        Self::ReadTimeout,
        Self::Unavailable,
        Self::Other,
    ];

    pub const fn unit(self) -> MeasurementUnit {
        MeasurementUnit::Errors
    }
}
