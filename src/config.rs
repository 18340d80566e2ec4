//! Run configuration: TOML file defaults layered under CLI overrides.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::types::Input;

/// Knobs shared by every run mode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Number of worker threads in the pool.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// Inputs run are `1..=task_count`.
    #[serde(default = "default_task_count")]
    pub task_count: usize,
    /// Artificial per-task latency in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Maximum number of waiting jobs; absent means unbounded.
    #[serde(default)]
    pub queue_capacity: Option<usize>,
}

fn default_pool_size() -> usize {
    4
}

fn default_task_count() -> usize {
    10
}

fn default_delay_ms() -> u64 {
    500
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            task_count: default_task_count(),
            delay_ms: default_delay_ms(),
            queue_capacity: None,
        }
    }
}

/// Optional values that replace what the file (or defaults) provided.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub pool_size: Option<usize>,
    pub task_count: Option<usize>,
    pub delay_ms: Option<u64>,
    pub queue_capacity: Option<usize>,
}

impl RunConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` if given, otherwise start from defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            debug!("no config file given, using defaults");
            return Ok(Self::default());
        };
        debug!(config_path = %path.display(), "loading config");
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(path, &content)
    }

    /// Apply CLI overrides, then validate the result.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Result<Self, ConfigError> {
        if let Some(pool_size) = overrides.pool_size {
            self.pool_size = pool_size;
        }
        if let Some(task_count) = overrides.task_count {
            self.task_count = task_count;
        }
        if let Some(delay_ms) = overrides.delay_ms {
            self.delay_ms = delay_ms;
        }
        if overrides.queue_capacity.is_some() {
            self.queue_capacity = overrides.queue_capacity;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::Invalid("pool_size must be > 0".to_string()));
        }
        if self.task_count == 0 {
            return Err(ConfigError::Invalid("task_count must be > 0".to_string()));
        }
        if self.queue_capacity == Some(0) {
            return Err(ConfigError::Invalid(
                "queue_capacity must be > 0 when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// The ordered input sequence `1..=task_count`.
    pub fn inputs(&self) -> Vec<Input> {
        (1..=self.task_count as Input).collect()
    }

    /// Expected pooled wall-clock: `ceil(tasks / pool_size) * delay`.
    pub fn expected_pooled(&self) -> Duration {
        let batches = self.task_count.div_ceil(self.pool_size) as u32;
        self.delay() * batches
    }
}
