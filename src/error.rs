//! Error types shared by the task, pool, and handle layers.

use std::path::PathBuf;

/// Why a single task did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("interrupted while waiting")]
    Interrupted,
    #[error("task failed: {0}")]
    Failed(String),
    #[error("task panicked: {0}")]
    Panicked(String),
    #[error("task was dropped before it produced a result")]
    Abandoned,
}

/// Submission rejected by the worker pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("worker pool is shut down")]
    ShutDown,
    #[error("worker pool queue is full (capacity {capacity})")]
    Saturated { capacity: usize },
    #[error("worker pool needs at least one worker")]
    NoWorkers,
    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),
}

/// A second attempt to resolve an already resolved handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("result handle already resolved")]
    AlreadyResolved,
}

/// Failure of a bounded wait on a result handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GetError {
    #[error("result not available after {0:?}")]
    TimedOut(std::time::Duration),
    #[error(transparent)]
    Task(#[from] TaskError),
}

/// Problems loading or validating a run configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}
