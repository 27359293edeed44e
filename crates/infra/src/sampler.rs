//! Periodic gauge sampling
//!
//! Pull gauges only change when something reads their provider. The sampler
//! owns a tokio task that does this on a fixed interval until it is stopped.
//! Join handles are tracked and cancellation is explicit.

use std::sync::Arc;
use std::time::Duration;

use driverscope_domain::DriverScopeError;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use crate::backend::GaugeSampling;

/// Sampler lifecycle errors
#[derive(Debug, Error)]
pub enum SamplerError {
    #[error("Gauge sampler already running")]
    AlreadyRunning,

    #[error("Gauge sampler not running")]
    NotRunning,

    #[error("Sampling interval must be greater than zero")]
    InvalidInterval,

    #[error("Gauge sampler did not stop within {0:?}")]
    Timeout(Duration),

    #[error("Gauge sampler task failed: {0}")]
    TaskJoinFailed(String),
}

impl From<SamplerError> for DriverScopeError {
    fn from(err: SamplerError) -> Self {
        match err {
            SamplerError::InvalidInterval => DriverScopeError::Config(err.to_string()),
            _ => DriverScopeError::Internal(err.to_string()),
        }
    }
}

pub type SamplerResult<T> = Result<T, SamplerError>;

/// Background task sampling a backend's gauges
pub struct GaugeSampler {
    backend: Arc<dyn GaugeSampling>,
    interval: Duration,
    join_timeout: Duration,
    handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
}

impl GaugeSampler {
    pub fn new(backend: Arc<dyn GaugeSampling>, interval: Duration) -> Self {
        Self {
            backend,
            interval,
            join_timeout: Duration::from_secs(5),
            handle: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Spawn the sampling task on the current tokio runtime
    ///
    /// # Errors
    /// `AlreadyRunning` if started twice, `InvalidInterval` for a zero
    /// interval.
    #[instrument(skip_all)]
    pub fn start(&mut self) -> SamplerResult<()> {
        if self.is_running() {
            return Err(SamplerError::AlreadyRunning);
        }
        if self.interval.is_zero() {
            return Err(SamplerError::InvalidInterval);
        }

        self.cancellation = CancellationToken::new();
        let cancel = self.cancellation.clone();
        let backend = Arc::clone(&self.backend);
        let period = self.interval;

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        debug!("Gauge sampler cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        let sampled = backend.sample_gauges();
                        trace!(sampled, "Sampled gauges");
                    }
                }
            }
        }));

        info!(interval_ms = period.as_millis() as u64, "Gauge sampler started");
        Ok(())
    }

    /// Cancel the task and wait for it to exit
    ///
    /// # Errors
    /// `NotRunning` if never started, `Timeout` or `TaskJoinFailed` if the
    /// task does not exit cleanly.
    pub async fn stop(&mut self) -> SamplerResult<()> {
        let Some(handle) = self.handle.take() else {
            return Err(SamplerError::NotRunning);
        };

        self.cancellation.cancel();
        tokio::time::timeout(self.join_timeout, handle)
            .await
            .map_err(|_| SamplerError::Timeout(self.join_timeout))?
            .map_err(|e| SamplerError::TaskJoinFailed(e.to_string()))?;

        info!("Gauge sampler stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for GaugeSampler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("GaugeSampler dropped while running; cancelling task");
        }
        self.cancellation.cancel();
    }
}

impl std::fmt::Debug for GaugeSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GaugeSampler")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}
