//! Prometheus backend
//!
//! Each metric name maps to one labelled vector in a private [`Registry`];
//! a descriptor's context becomes the `context` label (empty when absent).
//! Prometheus names cannot contain `-`, so `request-timer` is exported as
//! `{namespace}_request_timer` and the original identifier is kept in the
//! help text.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use driverscope_core::{GaugeProvider, MetricsBackend, TimerHandle};
use driverscope_domain::{
    MetricKind, MetricSpec, MetricsError, MetricsResult, SeriesKey, TimeUnit,
};
use prometheus::proto::MetricFamily;
use prometheus::{
    CounterVec, Encoder, GaugeVec, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use tracing::debug;

use super::GaugeSampling;

const CONTEXT_LABEL: &str = "context";

/// Exports driver metrics through a `prometheus` registry
pub struct PrometheusBackend {
    namespace: String,
    buckets: Vec<f64>,
    registry: Registry,
    counters: DashMap<String, CounterVec>,
    histograms: DashMap<String, HistogramVec>,
    gauges: DashMap<String, GaugeVec>,
    providers: DashMap<SeriesKey, GaugeProvider>,
}

impl PrometheusBackend {
    /// `buckets` are histogram bounds in milliseconds
    pub fn new(namespace: impl Into<String>, buckets: Vec<f64>) -> Self {
        Self {
            namespace: namespace.into(),
            buckets,
            registry: Registry::new(),
            counters: DashMap::new(),
            histograms: DashMap::new(),
            gauges: DashMap::new(),
            providers: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Sample pull gauges, then collect every family
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.sample_gauges();
        self.registry.gather()
    }

    /// Text exposition format of [`gather`](Self::gather)
    ///
    /// # Errors
    /// Returns `MetricsError::Backend` if encoding fails.
    pub fn encode_text(&self) -> MetricsResult<String> {
        let families = self.gather();
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&families, &mut buffer)
            .map_err(|e| MetricsError::Backend(format!("Failed to encode metrics: {e}")))?;
        String::from_utf8(buffer)
            .map_err(|e| MetricsError::Backend(format!("Metrics output is not UTF-8: {e}")))
    }

    fn counter_vec(&self, spec: &MetricSpec) -> MetricsResult<CounterVec> {
        let entry = self.counters.entry(spec.name().to_string()).or_try_insert_with(|| {
            let opts = Opts::new(export_name(spec.name()), help_text(spec))
                .namespace(self.namespace.clone());
            let vec = CounterVec::new(opts, &[CONTEXT_LABEL])
                .map_err(|e| MetricsError::registration(spec.name(), e))?;
            self.register(spec, vec.clone())?;
            Ok::<_, MetricsError>(vec)
        })?;
        Ok(entry.value().clone())
    }

    fn histogram_vec(&self, spec: &MetricSpec) -> MetricsResult<HistogramVec> {
        let entry = self.histograms.entry(spec.name().to_string()).or_try_insert_with(|| {
            let opts = HistogramOpts::new(export_name(spec.name()), help_text(spec))
                .namespace(self.namespace.clone())
                .buckets(self.buckets.clone());
            let vec = HistogramVec::new(opts, &[CONTEXT_LABEL])
                .map_err(|e| MetricsError::registration(spec.name(), e))?;
            self.register(spec, vec.clone())?;
            Ok::<_, MetricsError>(vec)
        })?;
        Ok(entry.value().clone())
    }

    fn gauge_vec(&self, spec: &MetricSpec) -> MetricsResult<GaugeVec> {
        let entry = self.gauges.entry(spec.name().to_string()).or_try_insert_with(|| {
            let opts = Opts::new(export_name(spec.name()), help_text(spec))
                .namespace(self.namespace.clone());
            let vec = GaugeVec::new(opts, &[CONTEXT_LABEL])
                .map_err(|e| MetricsError::registration(spec.name(), e))?;
            self.register(spec, vec.clone())?;
            Ok::<_, MetricsError>(vec)
        })?;
        Ok(entry.value().clone())
    }

    fn register<C>(&self, spec: &MetricSpec, collector: C) -> MetricsResult<()>
    where
        C: prometheus::core::Collector + 'static,
    {
        self.registry
            .register(Box::new(collector))
            .map_err(|e| MetricsError::registration(spec.name(), e))?;
        debug!(metric = %spec.name(), kind = %spec.kind(), "Registered prometheus collector");
        Ok(())
    }

    fn publish(&self, key: &SeriesKey, value: f64) {
        if let Some(vec) = self.gauges.get(&*key.name) {
            vec.with_label_values(&[key.context_label()]).set(value);
        }
    }
}

impl GaugeSampling for PrometheusBackend {
    fn sample_gauges(&self) -> usize {
        // Providers are user code; call them without holding map shards.
        let providers: Vec<(SeriesKey, GaugeProvider)> =
            self.providers.iter().map(|e| (e.key().clone(), e.value().clone())).collect();
        for (key, provider) in &providers {
            self.publish(key, provider());
        }
        providers.len()
    }
}

impl MetricsBackend for PrometheusBackend {
    fn set_gauge(&self, spec: &MetricSpec, provider: GaugeProvider) -> MetricsResult<()> {
        let vec = self.gauge_vec(spec)?;
        vec.with_label_values(&[spec.series_key().context_label()]).set(provider());
        self.providers.insert(spec.series_key(), provider);
        Ok(())
    }

    fn increment(&self, spec: &MetricSpec) -> MetricsResult<()> {
        let vec = self.counter_vec(spec)?;
        vec.with_label_values(&[spec.series_key().context_label()]).inc();
        Ok(())
    }

    fn time(&self, spec: &MetricSpec) -> MetricsResult<Box<dyn TimerHandle>> {
        let vec = self.histogram_vec(spec)?;
        let histogram = vec.with_label_values(&[spec.series_key().context_label()]);
        Ok(Box::new(PrometheusTimer {
            histogram,
            unit: spec.duration_unit(),
            started: Instant::now(),
        }))
    }
}

impl std::fmt::Debug for PrometheusBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusBackend")
            .field("namespace", &self.namespace)
            .field("gauges", &self.providers.len())
            .finish_non_exhaustive()
    }
}

struct PrometheusTimer {
    histogram: Histogram,
    unit: TimeUnit,
    started: Instant,
}

impl TimerHandle for PrometheusTimer {
    fn stop(self: Box<Self>) {
        self.histogram.observe(self.unit.convert(self.started.elapsed()));
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Prometheus-safe form of a metric identifier
pub fn export_name(name: &str) -> String {
    name.chars().map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }).collect()
}

fn help_text(spec: &MetricSpec) -> String {
    match spec.kind() {
        MetricKind::Timer => {
            format!(
                "{} ({}, {}, rate per {})",
                spec.name(),
                spec.unit(),
                spec.duration_unit(),
                spec.rate_unit()
            )
        }
        _ => format!("{} ({})", spec.name(), spec.unit()),
    }
}
