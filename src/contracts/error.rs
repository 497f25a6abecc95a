use thiserror::Error;

/// A single problem found while building a [`MetricsRegistry`].
///
/// [`MetricsRegistry`]: crate::metrics::MetricsRegistry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricError {
    #[error("Duplicate metric name: {0}")]
    DuplicateMetricName(String),

    #[error("Registration rejected for {name}: {reason}")]
    Registration { name: String, reason: String },
}

/// Every error encountered while constructing a registry, reported together.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Metrics registry construction failed: {}", describe_errors(.errors))]
pub struct RegistryError {
    errors: Vec<MetricError>,
}

impl RegistryError {
    pub(crate) fn new(errors: Vec<MetricError>) -> Self {
        Self { errors }
    }

    /// Returns the individual failures in the order they were found.
    pub fn errors(&self) -> &[MetricError] {
        &self.errors
    }

    /// Returns true if any failure is a duplicate of `name`.
    pub fn has_duplicate(&self, name: &str) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e, MetricError::DuplicateMetricName(n) if n == name))
    }
}

fn describe_errors(errors: &[MetricError]) -> String {
    let joined = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    format!("{} error(s): {joined}", errors.len())
}

/// An engine event that cannot be interpreted.
///
/// Absorbed by the dispatcher: counted and logged, never propagated to the
/// engine thread that raised it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedEvent {
    #[error("Compaction {job_id} has no input levels")]
    NoInputLevels { job_id: u64 },
}
