use std::time::Duration;

/// Default metric namespace prefix.
pub const DEFAULT_NAMESPACE: &str = "lsm";

/// Default averager half-life.
pub const DEFAULT_HALF_LIFE: Duration = Duration::from_secs(10);

/// Configuration for the metrics registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Prefix joined to every metric name with `_`. Empty means no prefix.
    pub namespace: String,
    /// Time after which an averager sample's weight halves.
    pub averager_half_life: Duration,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.into(),
            averager_half_life: DEFAULT_HALF_LIFE,
        }
    }
}

impl MetricsConfig {
    /// Creates a config from environment variables.
    ///
    /// Reads:
    /// - `LSM_METRICS_NAMESPACE`: Metric name prefix (default: "lsm")
    /// - `LSM_METRICS_HALF_LIFE_MS`: Averager half-life in ms (default: 10000)
    ///
    /// Unparseable or zero half-lives fall back to the default.
    pub fn from_env() -> Self {
        let default = Self::default();

        let namespace = std::env::var("LSM_METRICS_NAMESPACE").unwrap_or(default.namespace);

        let averager_half_life = std::env::var("LSM_METRICS_HALF_LIFE_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(default.averager_half_life);

        Self {
            namespace,
            averager_half_life,
        }
    }

    /// Sets the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the averager half-life.
    pub fn with_half_life(mut self, half_life: Duration) -> Self {
        self.averager_half_life = half_life;
        self
    }
}
