//! Fixed-size worker pool with blocking result handles, plus the sequential
//! baseline and timing harness used to compare the two.

pub mod collector;
pub mod config;
pub mod error;
pub mod logging;
pub mod pool;
pub mod result_handle;
pub mod sequential;
pub mod sim;
pub mod task;
pub mod task_queue;
pub mod timing;
pub mod types;

pub use collector::{ItemOutcome, Report};
pub use config::RunConfig;
pub use error::{ConfigError, GetError, PoolError, ResolveError, TaskError};
pub use pool::WorkerPool;
pub use result_handle::{ResultHandle, Resolver};
pub use task::{Interrupt, Job, SquareTask};
