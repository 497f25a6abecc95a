//! Registry owning every named metric instance.
//!
//! The key set is fixed at construction. Construction validates all
//! requested metrics first and reports every problem in one
//! [`RegistryError`], so a misconfigured process fails to start instead of
//! running with metrics silently missing.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{names, Averager, AveragerSnapshot, Counter, Gauge};
use crate::config::MetricsConfig;
use crate::contracts::{MetricError, RegistryError};

/// The type of a registered metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Averager,
    Counter,
    Gauge,
}

/// Request to register one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSpec<'a> {
    /// Name without namespace
    pub name: &'a str,
    /// Description shown to operators
    pub help: &'a str,
    pub kind: MetricKind,
}

impl<'a> MetricSpec<'a> {
    pub const fn averager(name: &'a str, help: &'a str) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Averager,
        }
    }

    pub const fn counter(name: &'a str, help: &'a str) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Counter,
        }
    }

    pub const fn gauge(name: &'a str, help: &'a str) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Gauge,
        }
    }
}

/// A registered metric instance.
#[derive(Debug, Clone)]
pub enum Metric {
    Averager(Arc<Averager>),
    Counter(Arc<Counter>),
    Gauge(Arc<Gauge>),
}

impl Metric {
    fn new(kind: MetricKind, config: &MetricsConfig) -> Self {
        match kind {
            MetricKind::Averager => Metric::Averager(Arc::new(Averager::new(
                config.averager_half_life,
            ))),
            MetricKind::Counter => Metric::Counter(Arc::new(Counter::new())),
            MetricKind::Gauge => Metric::Gauge(Arc::new(Gauge::new())),
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::Averager(_) => MetricKind::Averager,
            Metric::Counter(_) => MetricKind::Counter,
            Metric::Gauge(_) => MetricKind::Gauge,
        }
    }

    /// Reads the current value.
    pub fn sample(&self) -> SampleValue {
        match self {
            Metric::Averager(a) => SampleValue::Averager(a.snapshot()),
            Metric::Counter(c) => SampleValue::Counter { value: c.value() },
            Metric::Gauge(g) => SampleValue::Gauge { value: g.value() },
        }
    }
}

/// Value of one metric at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SampleValue {
    Averager(AveragerSnapshot),
    Counter { value: u64 },
    Gauge { value: i64 },
}

/// One metric in a [`RegistrySnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Fully-qualified name (`<namespace>_<name>`)
    pub name: String,
    pub help: String,
    pub value: SampleValue,
}

/// Point-in-time read of every metric, ordered by name.
///
/// Each sample is internally consistent; samples of different metrics may
/// come from slightly different moments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub namespace: String,
    pub metrics: Vec<MetricSample>,
}

impl RegistrySnapshot {
    /// Looks up a sample by its fully-qualified name.
    pub fn get(&self, full_name: &str) -> Option<&MetricSample> {
        self.metrics.iter().find(|m| m.name == full_name)
    }
}

#[derive(Debug)]
struct Entry {
    full_name: String,
    help: String,
    metric: Metric,
}

/// Fixed set of named metrics.
#[derive(Debug)]
pub struct MetricsRegistry {
    namespace: String,
    metrics: BTreeMap<String, Entry>,
}

impl MetricsRegistry {
    /// Builds a registry holding one metric per spec.
    ///
    /// Fails if two specs share a name or a name/help pair breaks the
    /// exposition naming rules. All failures are collected before returning.
    pub fn new(config: &MetricsConfig, specs: &[MetricSpec<'_>]) -> Result<Self, RegistryError> {
        let mut errors = Vec::new();
        let mut seen = HashSet::with_capacity(specs.len());
        let mut metrics = BTreeMap::new();

        for spec in specs {
            if !seen.insert(spec.name) {
                errors.push(MetricError::DuplicateMetricName(spec.name.to_string()));
                continue;
            }

            let full_name = qualified_name(&config.namespace, spec.name);
            if let Err(reason) = validate(&full_name, spec.help) {
                errors.push(MetricError::Registration {
                    name: full_name,
                    reason,
                });
                continue;
            }

            metrics.insert(
                spec.name.to_string(),
                Entry {
                    full_name,
                    help: spec.help.to_string(),
                    metric: Metric::new(spec.kind, config),
                },
            );
        }

        if !errors.is_empty() {
            return Err(RegistryError::new(errors));
        }

        tracing::info!(
            namespace = %config.namespace,
            metrics = metrics.len(),
            "Metrics registry initialized"
        );

        Ok(Self {
            namespace: config.namespace.clone(),
            metrics,
        })
    }

    /// Builds a registry with the engine metric set from [`names::STANDARD`].
    pub fn standard(config: &MetricsConfig) -> Result<Self, RegistryError> {
        Self::new(config, &names::STANDARD)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }

    /// Looks up a metric by its unqualified name.
    pub fn get(&self, name: &str) -> Option<&Metric> {
        self.metrics.get(name).map(|e| &e.metric)
    }

    /// Returns the averager registered as `name`.
    ///
    /// # Panics
    /// If `name` is not registered or is not an averager. The key set is
    /// fixed at construction, so this is a programming error.
    pub fn averager(&self, name: &str) -> Arc<Averager> {
        match self.get(name) {
            Some(Metric::Averager(a)) => Arc::clone(a),
            other => lookup_failed(name, MetricKind::Averager, other),
        }
    }

    /// Returns the counter registered as `name`.
    ///
    /// # Panics
    /// If `name` is not registered or is not a counter.
    pub fn counter(&self, name: &str) -> Arc<Counter> {
        match self.get(name) {
            Some(Metric::Counter(c)) => Arc::clone(c),
            other => lookup_failed(name, MetricKind::Counter, other),
        }
    }

    /// Returns the gauge registered as `name`.
    ///
    /// # Panics
    /// If `name` is not registered or is not a gauge.
    pub fn gauge(&self, name: &str) -> Arc<Gauge> {
        match self.get(name) {
            Some(Metric::Gauge(g)) => Arc::clone(g),
            other => lookup_failed(name, MetricKind::Gauge, other),
        }
    }

    /// Reads every metric.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            namespace: self.namespace.clone(),
            metrics: self
                .metrics
                .values()
                .map(|e| MetricSample {
                    name: e.full_name.clone(),
                    help: e.help.clone(),
                    value: e.metric.sample(),
                })
                .collect(),
        }
    }
}

fn lookup_failed(name: &str, expected: MetricKind, found: Option<&Metric>) -> ! {
    match found {
        Some(metric) => panic!(
            "metric {name:?} is registered as {:?}, not {expected:?}",
            metric.kind()
        ),
        None => panic!("metric {name:?} is not registered"),
    }
}

fn qualified_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}_{name}")
    }
}

/// Checks a fully-qualified name against `[a-zA-Z_:][a-zA-Z0-9_:]*`.
fn validate(full_name: &str, help: &str) -> Result<(), String> {
    let mut chars = full_name.chars();
    match chars.next() {
        None => return Err("metric name is empty".into()),
        Some(c) if !(c.is_ascii_alphabetic() || c == '_' || c == ':') => {
            return Err(format!("metric name cannot start with {c:?}"));
        }
        Some(_) => {}
    }
    if let Some(c) = chars.find(|&c| !(c.is_ascii_alphanumeric() || c == '_' || c == ':')) {
        return Err(format!("invalid character {c:?} in metric name"));
    }
    if help.trim().is_empty() {
        return Err("help text is empty".into());
    }
    Ok(())
}
