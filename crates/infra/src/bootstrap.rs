//! Runtime assembly
//!
//! Turns a [`MetricsConfig`] into a ready [`MetricsManager`] plus the handle
//! the host uses to read the exported numbers.

use std::sync::Arc;
use std::time::Duration;

use driverscope_core::{MetricsBackend, MetricsManager};
use driverscope_domain::{BackendKind, MetricsConfig, Result};
use tracing::info;

use crate::backend::{GaugeSampling, InMemoryBackend, PrometheusBackend};
use crate::sampler::GaugeSampler;

/// Where the collected metrics can be read from
#[derive(Debug, Clone)]
pub enum MetricsExport {
    Disabled,
    Prometheus(Arc<PrometheusBackend>),
    Memory(Arc<InMemoryBackend>),
}

impl MetricsExport {
    fn sampling(&self) -> Option<Arc<dyn GaugeSampling>> {
        match self {
            Self::Disabled => None,
            Self::Prometheus(backend) => Some(Arc::clone(backend) as Arc<dyn GaugeSampling>),
            Self::Memory(backend) => Some(Arc::clone(backend) as Arc<dyn GaugeSampling>),
        }
    }
}

/// Manager, export handle and gauge sampler built from one configuration
#[derive(Debug)]
pub struct MetricsRuntime {
    manager: MetricsManager,
    export: MetricsExport,
    sampler: Option<GaugeSampler>,
}

impl MetricsRuntime {
    pub fn manager(&self) -> &MetricsManager {
        &self.manager
    }

    pub fn export(&self) -> &MetricsExport {
        &self.export
    }

    /// Start periodic gauge sampling; no-op when metrics are disabled
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Returns an error if the sampler is already running.
    pub fn start_sampler(&mut self) -> Result<()> {
        match self.sampler.as_mut() {
            Some(sampler) => Ok(sampler.start()?),
            None => Ok(()),
        }
    }

    pub fn is_sampling(&self) -> bool {
        self.sampler.as_ref().is_some_and(GaugeSampler::is_running)
    }

    /// Stop the sampler if it is running
    ///
    /// # Errors
    /// Returns an error if the sampling task does not exit cleanly.
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Some(sampler) = self.sampler.as_mut() {
            if sampler.is_running() {
                sampler.stop().await?;
            }
        }
        Ok(())
    }
}

/// Build the instrumentation runtime described by `config`
///
/// A disabled configuration yields a disabled manager and never constructs
/// a backend.
///
/// # Errors
/// Returns `DriverScopeError::Config` if `config` fails validation.
pub fn build_metrics_runtime(config: &MetricsConfig) -> Result<MetricsRuntime> {
    config.validate()?;

    if !config.enabled {
        info!("Metrics disabled");
        return Ok(MetricsRuntime {
            manager: MetricsManager::disabled(),
            export: MetricsExport::Disabled,
            sampler: None,
        });
    }

    let (backend, export): (Arc<dyn MetricsBackend>, MetricsExport) = match config.backend {
        BackendKind::Prometheus => {
            let backend = Arc::new(PrometheusBackend::new(
                config.namespace.clone(),
                config.timer_buckets_ms.clone(),
            ));
            (backend.clone(), MetricsExport::Prometheus(backend))
        }
        BackendKind::Memory => {
            let backend = Arc::new(InMemoryBackend::new());
            (backend.clone(), MetricsExport::Memory(backend))
        }
    };

    let sampler = export
        .sampling()
        .map(|target| GaugeSampler::new(target, Duration::from_millis(config.sample_interval_ms)));

    info!(
        backend = %config.backend,
        namespace = %config.namespace,
        sample_interval_ms = config.sample_interval_ms,
        "Metrics enabled"
    );

    Ok(MetricsRuntime { manager: MetricsManager::enabled(backend), export, sampler })
}
