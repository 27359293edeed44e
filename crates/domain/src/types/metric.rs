//! Metric descriptors
//!
//! A [`MetricSpec`] says *what* a series is (name, kind, unit, context); it
//! never carries a value. Backends key their storage on [`SeriesKey`], so two
//! specs with the same name and context always land on the same series.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::impl_domain_name_conversions;

/// Kind of instrument backing a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Timer,
    Counter,
    Gauge,
}

impl_domain_name_conversions!(MetricKind {
    Timer => "timer",
    Counter => "counter",
    Gauge => "gauge",
});

/// Semantic unit of what a metric counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementUnit {
    Requests,
    Connections,
    Errors,
    Items,
}

impl_domain_name_conversions!(MeasurementUnit {
    Requests => "requests",
    Connections => "connections",
    Errors => "errors",
    Items => "items",
});

/// Unit used when a timer reports durations or rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Microseconds,
    #[default]
    Milliseconds,
    Seconds,
}

impl_domain_name_conversions!(TimeUnit {
    Microseconds => "microseconds",
    Milliseconds => "milliseconds",
    Seconds => "seconds",
});

impl TimeUnit {
    /// Express `elapsed` in this unit
    pub fn convert(self, elapsed: Duration) -> f64 {
        match self {
            Self::Microseconds => elapsed.as_secs_f64() * 1_000_000.0,
            Self::Milliseconds => elapsed.as_secs_f64() * 1_000.0,
            Self::Seconds => elapsed.as_secs_f64(),
        }
    }
}

/// Identity of a single series inside a backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesKey {
    pub name: Cow<'static, str>,
    pub context: Option<String>,
}

impl SeriesKey {
    pub fn new(name: impl Into<Cow<'static, str>>, context: Option<String>) -> Self {
        Self { name: name.into(), context }
    }

    /// Context label value, empty when the series is not partitioned
    pub fn context_label(&self) -> &str {
        self.context.as_deref().unwrap_or("")
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{}[{}]", self.name, context),
            None => f.write_str(&self.name),
        }
    }
}

/// Immutable descriptor of a timer, counter or gauge
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricSpec {
    name: Cow<'static, str>,
    kind: MetricKind,
    unit: MeasurementUnit,
    duration_unit: TimeUnit,
    rate_unit: TimeUnit,
    context: Option<String>,
}

impl MetricSpec {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        kind: MetricKind,
        unit: MeasurementUnit,
        context: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            unit,
            duration_unit: TimeUnit::Milliseconds,
            rate_unit: TimeUnit::Milliseconds,
            context,
        }
    }

    /// Timer spec reporting durations and rates in milliseconds
    pub fn timer(name: &'static str, unit: MeasurementUnit) -> Self {
        Self::new(name, MetricKind::Timer, unit, None)
    }

    pub fn counter(name: &'static str, unit: MeasurementUnit) -> Self {
        Self::new(name, MetricKind::Counter, unit, None)
    }

    pub fn gauge(name: &'static str, unit: MeasurementUnit) -> Self {
        Self::new(name, MetricKind::Gauge, unit, None)
    }

    /// Copy of this spec partitioned by `context`
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[must_use]
    pub fn with_duration_unit(mut self, unit: TimeUnit) -> Self {
        self.duration_unit = unit;
        self
    }

    #[must_use]
    pub fn with_rate_unit(mut self, unit: TimeUnit) -> Self {
        self.rate_unit = unit;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn unit(&self) -> MeasurementUnit {
        self.unit
    }

    pub fn duration_unit(&self) -> TimeUnit {
        self.duration_unit
    }

    pub fn rate_unit(&self) -> TimeUnit {
        self.rate_unit
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Series identity used by backends for idempotent registration
    pub fn series_key(&self) -> SeriesKey {
        SeriesKey { name: self.name.clone(), context: self.context.clone() }
    }
}

impl fmt::Display for MetricSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.kind, self.series_key(), self.unit)
    }
}
