//! Shared identifiers and the queued work item used across the system.

use std::fmt;

/// Submission-order identifier assigned by the worker pool.
pub type TaskId = u64;
/// Value fed into a square task.
pub type Input = i64;
/// Value produced by a square task.
pub type Output = i64;

/// Type-erased unit of work sitting in the pool queue.
///
/// The closure owns both the job and the resolver of its result handle, so
/// running it is all a worker needs to do.
pub struct Task {
    /// Stable task identifier for logging.
    pub id: TaskId,
    /// Human-readable description for log output.
    pub description: String,
    run: Box<dyn FnOnce() + Send + 'static>,
}

impl Task {
    /// Construct a new task with the provided id, description and body.
    pub fn new(
        id: TaskId,
        description: impl Into<String>,
        run: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            run: Box::new(run),
        }
    }

    /// Consume the task and execute its body on the current thread.
    pub fn run(self) {
        (self.run)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
