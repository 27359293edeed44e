//! Metrics manager
//!
//! Single entry point the driver uses for instrumentation. A manager built
//! without a backend is disabled: every operation returns immediately and
//! timer starts yield `None`.
//!
//! Backend faults are logged and dropped here. Instrumentation never changes
//! the outcome of the operation it observes.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use driverscope_common::ErrorClassification;
use driverscope_domain::{DriverError, ErrorCounter, GaugeId, MetricSpec, TableMeta, TimerId};
use tracing::{debug, warn};

use crate::classifier::{classify, classify_any};
use crate::completion::CompletionSourceWithMetrics;
use crate::ports::{GaugeProvider, MetricsBackend};
use crate::registry::MetricsRegistry;
use crate::timer::ScopedTimerContext;

/// Facade over an optional metrics backend
///
/// Cloning is cheap and every clone shares the same backend and registry.
#[derive(Clone)]
pub struct MetricsManager {
    backend: Option<Arc<dyn MetricsBackend>>,
    registry: Arc<MetricsRegistry>,
}

impl MetricsManager {
    /// Enabled exactly when `backend` is present
    pub fn new(backend: Option<Arc<dyn MetricsBackend>>) -> Self {
        Self::with_registry(backend, Arc::new(MetricsRegistry::new()))
    }

    pub fn with_registry(
        backend: Option<Arc<dyn MetricsBackend>>,
        registry: Arc<MetricsRegistry>,
    ) -> Self {
        debug!(enabled = backend.is_some(), "Metrics manager created");
        Self { backend, registry }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn enabled(backend: Arc<dyn MetricsBackend>) -> Self {
        Self::new(Some(backend))
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Live backend, `None` when disabled
    pub fn backend(&self) -> Option<&Arc<dyn MetricsBackend>> {
        self.backend.as_ref()
    }

    pub fn registry(&self) -> &MetricsRegistry {
        &self.registry
    }

    // ------------------------------------------------------------------
    // Gauges
    // ------------------------------------------------------------------

    /// Register a pull gauge; a later registration for the same id wins
    pub fn register_gauge<F>(&self, id: GaugeId, provider: F)
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        let Some(backend) = &self.backend else {
            return;
        };
        let spec = self.registry.gauge(id);
        let provider: GaugeProvider = Arc::new(provider);
        match backend.set_gauge(spec, provider) {
            Ok(()) => debug!(metric = %spec.name(), "Gauge registered"),
            Err(err) => warn!(metric = %spec.name(), error = %err, "Failed to register gauge"),
        }
    }

    pub fn register_known_hosts_gauge<F>(&self, provider: F)
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        self.register_gauge(GaugeId::KnownHosts, provider);
    }

    pub fn register_connected_sessions_gauge<F>(&self, provider: F)
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        self.register_gauge(GaugeId::ConnectedSessions, provider);
    }

    pub fn register_connected_to_hosts_gauge<F>(&self, provider: F)
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        self.register_gauge(GaugeId::ConnectedToHosts, provider);
    }

    pub fn register_open_connections_gauge<F>(&self, provider: F)
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        self.register_gauge(GaugeId::OpenConnections, provider);
    }

    pub fn register_in_flight_requests_gauge<F>(&self, provider: F)
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        self.register_gauge(GaugeId::InFlightRequests, provider);
    }

    pub fn register_write_queue_length_gauge<F>(&self, provider: F)
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        self.register_gauge(GaugeId::WriteQueueLength, provider);
    }

    pub fn register_free_operations_length_gauge<F>(&self, provider: F)
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        self.register_gauge(GaugeId::FreeOperationsLength, provider);
    }

    // ------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------

    pub fn start_timer(&self, id: TimerId) -> Option<ScopedTimerContext> {
        let backend = self.backend.as_ref()?;
        Self::start(backend.as_ref(), self.registry.timer(id))
    }

    /// Start the request timer for `target`, or the undefined target
    pub fn start_request_timer(&self, target: Option<&TableMeta>) -> Option<ScopedTimerContext> {
        let backend = self.backend.as_ref()?;
        Self::start(backend.as_ref(), &self.registry.request_timer(target))
    }

    pub fn start_cluster_connect_timer(&self) -> Option<ScopedTimerContext> {
        self.start_timer(TimerId::ClusterConnect)
    }

    pub fn start_open_connection_timer(&self) -> Option<ScopedTimerContext> {
        self.start_timer(TimerId::OpenConnection)
    }

    pub fn start_write_queue_timer(&self) -> Option<ScopedTimerContext> {
        self.start_timer(TimerId::WriteQueue)
    }

    pub fn start_pending_request_timer(&self) -> Option<ScopedTimerContext> {
        self.start_timer(TimerId::PendingRequest)
    }

    fn start(backend: &dyn MetricsBackend, spec: &MetricSpec) -> Option<ScopedTimerContext> {
        match backend.time(spec) {
            Ok(handle) => Some(ScopedTimerContext::new(handle)),
            Err(err) => {
                warn!(metric = %spec, error = %err, "Failed to start timer");
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Counters
    // ------------------------------------------------------------------

    pub fn increment_counter(&self, id: ErrorCounter) {
        let Some(backend) = &self.backend else {
            return;
        };
        let spec = self.registry.counter(id);
        if let Err(err) = backend.increment(spec) {
            warn!(metric = %spec.name(), error = %err, "Failed to increment counter");
        }
    }

    /// Count a failed operation under its classified counter
    pub fn report_failure(&self, error: &DriverError) {
        if self.backend.is_none() {
            return;
        }
        let counter = classify(error);
        debug!(
            counter = %counter,
            severity = %error.severity(),
            error = %error,
            "Reporting failure"
        );
        self.increment_counter(counter);
    }

    /// Count a failure that may not originate in the driver
    pub fn report_error(&self, error: &(dyn StdError + 'static)) {
        if self.backend.is_none() {
            return;
        }
        self.increment_counter(classify_any(error));
    }

    // ------------------------------------------------------------------
    // Async operations
    // ------------------------------------------------------------------

    /// Run `operation` under the request timer for `target`
    ///
    /// Success records the duration. Failure records no duration, counts the
    /// classified error and returns it unchanged. Dropping the returned
    /// future before it finishes counts as a cancellation.
    pub async fn instrument<T, F>(
        &self,
        target: Option<&TableMeta>,
        operation: F,
    ) -> Result<T, DriverError>
    where
        F: Future<Output = Result<T, DriverError>>,
    {
        if self.backend.is_none() {
            return operation.await;
        }
        let (source, completion) = CompletionSourceWithMetrics::for_request(self, target);
        match operation.await {
            Ok(value) => source.try_set_result(value),
            Err(err) => source.try_set_error(err),
        };
        completion.await
    }
}

impl Default for MetricsManager {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Debug for MetricsManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsManager").field("enabled", &self.is_enabled()).finish()
    }
}
