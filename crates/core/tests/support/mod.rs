//! Shared test helpers for `driverscope-core` integration tests.
//!
//! [`RecordingBackend`] keeps every observation in memory so tests can assert
//! on exact counts instead of exporter output.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use driverscope_core::{GaugeProvider, MetricsBackend, MetricsManager, TimerHandle};
use driverscope_domain::{MetricSpec, MetricsError, MetricsResult, SeriesKey};
use parking_lot::Mutex;

#[derive(Default)]
struct Recorded {
    counters: HashMap<SeriesKey, u64>,
    samples: HashMap<SeriesKey, Vec<Duration>>,
    gauges: HashMap<SeriesKey, GaugeProvider>,
}

/// In-memory backend that can be switched into a failing mode
#[derive(Default)]
pub struct RecordingBackend {
    recorded: Arc<Mutex<Recorded>>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl RecordingBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Manager wired to a fresh recording backend
    pub fn manager() -> (MetricsManager, Arc<Self>) {
        let backend = Self::new();
        let manager = MetricsManager::enabled(Arc::clone(&backend) as Arc<dyn MetricsBackend>);
        (manager, backend)
    }

    /// Every subsequent backend call returns an error
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn counter(&self, name: &str) -> u64 {
        let key = SeriesKey::new(name.to_string(), None);
        self.recorded.lock().counters.get(&key).copied().unwrap_or(0)
    }

    pub fn total_counts(&self) -> u64 {
        self.recorded.lock().counters.values().sum()
    }

    pub fn sample_count(&self, name: &str, context: Option<&str>) -> usize {
        let key = SeriesKey::new(name.to_string(), context.map(str::to_string));
        self.recorded.lock().samples.get(&key).map_or(0, Vec::len)
    }

    pub fn total_samples(&self) -> usize {
        self.recorded.lock().samples.values().map(Vec::len).sum()
    }

    pub fn gauge_series(&self) -> usize {
        self.recorded.lock().gauges.len()
    }

    /// Current value of a registered gauge
    pub fn sample_gauge(&self, name: &str) -> Option<f64> {
        let provider =
            self.recorded.lock().gauges.get(&SeriesKey::new(name.to_string(), None)).cloned()?;
        Some(provider())
    }

    fn enter(&self, spec: &MetricSpec) -> MetricsResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(MetricsError::Backend(format!("refusing {}", spec.name())));
        }
        Ok(())
    }
}

impl MetricsBackend for RecordingBackend {
    fn set_gauge(&self, spec: &MetricSpec, provider: GaugeProvider) -> MetricsResult<()> {
        self.enter(spec)?;
        self.recorded.lock().gauges.insert(spec.series_key(), provider);
        Ok(())
    }

    fn increment(&self, spec: &MetricSpec) -> MetricsResult<()> {
        self.enter(spec)?;
        *self.recorded.lock().counters.entry(spec.series_key()).or_insert(0) += 1;
        Ok(())
    }

    fn time(&self, spec: &MetricSpec) -> MetricsResult<Box<dyn TimerHandle>> {
        self.enter(spec)?;
        Ok(Box::new(RecordingTimer {
            key: spec.series_key(),
            started: Instant::now(),
            recorded: Arc::clone(&self.recorded),
        }))
    }
}

struct RecordingTimer {
    key: SeriesKey,
    started: Instant,
    recorded: Arc<Mutex<Recorded>>,
}

impl TimerHandle for RecordingTimer {
    fn stop(self: Box<Self>) {
        let elapsed = self.started.elapsed();
        self.recorded.lock().samples.entry(self.key).or_default().push(elapsed);
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

pub fn read_timeout() -> driverscope_domain::DriverError {
    driverscope_domain::DriverError::ReadTimeout {
        consistency: "LOCAL_QUORUM".to_string(),
        received: 1,
        required: 2,
        data_present: false,
    }
}
