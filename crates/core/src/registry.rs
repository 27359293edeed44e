//! Metric definition registry
//!
//! Holds the descriptors for every fixed metric and builds the per-table
//! request timer descriptors on demand. The registry is immutable once built
//! and is shared behind an `Arc`; there is no global instance.

use driverscope_domain::{
    ErrorCounter, GaugeId, MeasurementUnit, MetricKind, MetricSpec, TableMeta, TimerId,
    REQUEST_TIMER_NAME,
};

/// Catalog of metric descriptors
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    timers: Vec<MetricSpec>,
    gauges: Vec<MetricSpec>,
    counters: Vec<MetricSpec>,
    request_timer: MetricSpec,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            timers: TimerId::ALL.iter().map(|id| MetricSpec::timer(id.as_str(), id.unit())).collect(),
            gauges: GaugeId::ALL.iter().map(|id| MetricSpec::gauge(id.as_str(), id.unit())).collect(),
            counters: ErrorCounter::ALL
                .iter()
                .map(|id| MetricSpec::counter(id.as_str(), id.unit()))
                .collect(),
            request_timer: MetricSpec::timer(REQUEST_TIMER_NAME, MeasurementUnit::Requests),
        }
    }

    /// Descriptor for an arbitrary metric
    ///
    /// Identical inputs always produce specs with the same series identity.
    /// A blank context is replaced by the undefined-target context instead of
    /// being rejected.
    pub fn get_or_create(
        name: &str,
        unit: MeasurementUnit,
        kind: MetricKind,
        context: Option<&str>,
    ) -> MetricSpec {
        let context = context.map(|raw| {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                TableMeta::context_for(None)
            } else {
                trimmed.to_string()
            }
        });
        MetricSpec::new(name.to_string(), kind, unit, context)
    }

    pub fn timer(&self, id: TimerId) -> &MetricSpec {
        &self.timers[id as usize]
    }

    pub fn gauge(&self, id: GaugeId) -> &MetricSpec {
        &self.gauges[id as usize]
    }

    pub fn counter(&self, id: ErrorCounter) -> &MetricSpec {
        &self.counters[id as usize]
    }

    /// Request timer partitioned by `"{keyspace}.{table}"`
    ///
    /// Built per call; backends resolve equal contexts to one series.
    pub fn request_timer(&self, target: Option<&TableMeta>) -> MetricSpec {
        self.request_timer.clone().with_context(TableMeta::context_for(target))
    }

    /// Every fixed descriptor: timers, then gauges, then counters
    pub fn catalog(&self) -> impl Iterator<Item = &MetricSpec> + '_ {
        self.timers.iter().chain(&self.gauges).chain(&self.counters)
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups_match_ids() {
        let registry = MetricsRegistry::new();
        for id in TimerId::ALL {
            let spec = registry.timer(id);
            assert_eq!(spec.name(), id.as_str());
            assert_eq!(spec.kind(), MetricKind::Timer);
            assert_eq!(spec.unit(), id.unit());
        }
        for id in GaugeId::ALL {
            assert_eq!(registry.gauge(id).name(), id.as_str());
            assert_eq!(registry.gauge(id).kind(), MetricKind::Gauge);
        }
        for id in ErrorCounter::ALL {
            assert_eq!(registry.counter(id).name(), id.as_str());
            assert_eq!(registry.counter(id).unit(), MeasurementUnit::Errors);
        }
    }

    #[test]
    fn test_catalog_lists_fixed_metrics_once() {
        let registry = MetricsRegistry::new();
        let names: Vec<_> = registry.catalog().map(MetricSpec::name).collect();
        assert_eq!(names.len(), 17);
        assert!(!names.contains(&REQUEST_TIMER_NAME));
        assert!(registry.catalog().all(|spec| spec.context().is_none()));
    }

    #[test]
    fn test_request_timer_context() {
        let registry = MetricsRegistry::new();
        let meta = TableMeta::new("ks1", "t1");

        let spec = registry.request_timer(Some(&meta));
        assert_eq!(spec.name(), "request-timer");
        assert_eq!(spec.context(), Some("ks1.t1"));
        assert_eq!(spec.unit(), MeasurementUnit::Requests);

        let undefined = registry.request_timer(None);
        assert_eq!(undefined.context(), Some("undefined-keyspace.undefined-table"));
    }

    #[test]
    fn test_request_timer_is_deterministic() {
        let registry = MetricsRegistry::new();
        let meta = TableMeta::new("ks", "t");
        assert_eq!(
            registry.request_timer(Some(&meta)).series_key(),
            registry.request_timer(Some(&meta.clone())).series_key()
        );
    }

    #[test]
    fn test_get_or_create_sanitizes_blank_context() {
        let spec = MetricsRegistry::get_or_create(
            "request-timer",
            MeasurementUnit::Requests,
            MetricKind::Timer,
            Some("  "),
        );
        assert_eq!(spec.context(), Some("undefined-keyspace.undefined-table"));

        let plain = MetricsRegistry::get_or_create(
            "other-errors",
            MeasurementUnit::Errors,
            MetricKind::Counter,
            None,
        );
        assert_eq!(plain.series_key(), MetricSpec::counter("other-errors", MeasurementUnit::Errors).series_key());
    }
}
