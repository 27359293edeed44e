//! In-process backend
//!
//! Keeps counts and timer statistics in memory for hosts that read numbers
//! directly instead of scraping an exporter.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use driverscope_core::{GaugeProvider, MetricsBackend, TimerHandle};
use driverscope_domain::{MetricSpec, MetricsError, MetricsResult, SeriesKey, TimeUnit};
use parking_lot::Mutex;
use serde::Serialize;

use super::GaugeSampling;

/// Aggregate of every recorded duration for one timer series
///
/// Durations are stored in the spec's duration unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimerStats {
    pub duration_unit: TimeUnit,
    pub rate_unit: TimeUnit,
    pub count: u64,
    pub total: f64,
    pub min: f64,
    pub max: f64,
}

impl TimerStats {
    fn for_spec(spec: &MetricSpec) -> Self {
        Self {
            duration_unit: spec.duration_unit(),
            rate_unit: spec.rate_unit(),
            count: 0,
            total: 0.0,
            min: 0.0,
            max: 0.0,
        }
    }

    fn record(&mut self, elapsed: Duration) {
        let value = self.duration_unit.convert(elapsed);
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.total += value;
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.total / self.count as f64)
    }

    /// Recorded events per one `rate_unit` over `window`
    pub fn rate(&self, window: Duration) -> Option<f64> {
        let span = self.rate_unit.convert(window);
        (span > 0.0).then(|| self.count as f64 / span)
    }
}

/// Point-in-time copy of an [`InMemoryBackend`], keyed by `name[context]`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<String, u64>,
    pub timers: BTreeMap<String, TimerStats>,
    pub gauges: BTreeMap<String, f64>,
}

impl MetricsSnapshot {
    /// # Errors
    /// Returns `MetricsError::Backend` if serialization fails.
    pub fn to_json(&self) -> MetricsResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MetricsError::Backend(format!("Failed to serialize snapshot: {e}")))
    }
}

/// Backend storing every series in process memory
#[derive(Default)]
pub struct InMemoryBackend {
    counters: DashMap<SeriesKey, AtomicU64>,
    timers: DashMap<SeriesKey, Arc<Mutex<TimerStats>>>,
    providers: DashMap<SeriesKey, GaugeProvider>,
    last_gauges: DashMap<SeriesKey, f64>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, key: &SeriesKey) -> u64 {
        self.counters.get(key).map_or(0, |c| c.load(Ordering::Relaxed))
    }

    pub fn timer(&self, key: &SeriesKey) -> Option<TimerStats> {
        self.timers.get(key).map(|stats| *stats.lock())
    }

    /// Value from the most recent gauge sample
    pub fn gauge(&self, key: &SeriesKey) -> Option<f64> {
        self.last_gauges.get(key).map(|v| *v)
    }

    /// Sample gauges and copy every series
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.sample_gauges();
        MetricsSnapshot {
            counters: self
                .counters
                .iter()
                .map(|e| (e.key().to_string(), e.value().load(Ordering::Relaxed)))
                .collect(),
            timers: self.timers.iter().map(|e| (e.key().to_string(), *e.value().lock())).collect(),
            gauges: self.last_gauges.iter().map(|e| (e.key().to_string(), *e.value())).collect(),
        }
    }
}

impl GaugeSampling for InMemoryBackend {
    fn sample_gauges(&self) -> usize {
        let providers: Vec<(SeriesKey, GaugeProvider)> =
            self.providers.iter().map(|e| (e.key().clone(), e.value().clone())).collect();
        for (key, provider) in &providers {
            self.last_gauges.insert(key.clone(), provider());
        }
        providers.len()
    }
}

impl MetricsBackend for InMemoryBackend {
    fn set_gauge(&self, spec: &MetricSpec, provider: GaugeProvider) -> MetricsResult<()> {
        let key = spec.series_key();
        self.last_gauges.insert(key.clone(), provider());
        self.providers.insert(key, provider);
        Ok(())
    }

    fn increment(&self, spec: &MetricSpec) -> MetricsResult<()> {
        self.counters.entry(spec.series_key()).or_default().fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn time(&self, spec: &MetricSpec) -> MetricsResult<Box<dyn TimerHandle>> {
        let stats = Arc::clone(
            self.timers
                .entry(spec.series_key())
                .or_insert_with(|| Arc::new(Mutex::new(TimerStats::for_spec(spec))))
                .value(),
        );
        Ok(Box::new(MemoryTimer { stats, started: Instant::now() }))
    }
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("counters", &self.counters.len())
            .field("timers", &self.timers.len())
            .field("gauges", &self.providers.len())
            .finish()
    }
}

struct MemoryTimer {
    stats: Arc<Mutex<TimerStats>>,
    started: Instant,
}

impl TimerHandle for MemoryTimer {
    fn stop(self: Box<Self>) {
        self.stats.lock().record(self.started.elapsed());
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
