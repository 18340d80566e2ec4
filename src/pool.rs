//! Fixed-size worker pool over a shared FIFO queue.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{debug, error, info};

use crate::config::RunConfig;
use crate::error::{PoolError, TaskError};
use crate::result_handle::{self, ResultHandle};
use crate::task::Job;
use crate::task_queue::{PushRejected, TaskQueue};
use crate::types::{Task, TaskId};

/// A bounded set of named worker threads draining one task queue.
///
/// Submission order is FIFO; completion order is whatever the workers make
/// of it. Dropping the pool shuts it down gracefully.
pub struct WorkerPool {
    queue: Arc<TaskQueue>,
    workers: Mutex<Vec<thread::JoinHandle<()>>>,
    next_id: AtomicU64,
    size: usize,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn worker_loop(name: &str, queue: &TaskQueue) {
    let mut completed = 0usize;
    while let Some(task) = queue.pop_blocking_or_closed() {
        debug!(worker = name, task_id = task.id, task = %task.description, "picked up task");
        task.run();
        completed += 1;
    }
    debug!(worker = name, completed, "queue closed and drained, worker exiting");
}

impl WorkerPool {
    /// Spawn `pool_size` workers over a queue bounded by `queue_capacity`.
    pub fn new(pool_size: usize, queue_capacity: Option<usize>) -> Result<Self, PoolError> {
        if pool_size == 0 {
            return Err(PoolError::NoWorkers);
        }
        let queue = Arc::new(TaskQueue::with_capacity(queue_capacity));
        let mut workers = Vec::with_capacity(pool_size);
        for worker_id in 0..pool_size {
            let queue_for_worker = Arc::clone(&queue);
            let name = format!("worker-{worker_id}");
            let spawned = thread::Builder::new()
                .name(name.clone())
                .spawn(move || worker_loop(&name, &queue_for_worker));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(err) => {
                    queue.close();
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(PoolError::Spawn(err.to_string()));
                }
            }
        }
        info!(pool_size, ?queue_capacity, "worker pool started");
        Ok(Self {
            queue,
            workers: Mutex::new(workers),
            next_id: AtomicU64::new(0),
            size: pool_size,
        })
    }

    pub fn from_config(config: &RunConfig) -> Result<Self, PoolError> {
        Self::new(config.pool_size, config.queue_capacity)
    }

    /// Enqueue a job and return a pending handle for its outcome.
    ///
    /// Fails fast once shutdown has begun or when a bounded queue is full.
    pub fn submit<J: Job>(&self, job: J) -> Result<ResultHandle<J::Output>, PoolError> {
        let (mut resolver, handle) = result_handle::channel();
        let id: TaskId = self.next_id.fetch_add(1, Ordering::SeqCst);
        let description = job.describe();
        let task = Task::new(id, description, move || {
            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| job.execute())) {
                Ok(outcome) => outcome,
                Err(payload) => Err(TaskError::Panicked(panic_message(&*payload))),
            };
            // A freshly created resolver cannot already be resolved.
            let _ = resolver.resolve(outcome);
        });
        match self.queue.push(task) {
            Ok(()) => Ok(handle),
            Err(PushRejected::Closed(task)) => {
                debug!(task_id = task.id, "rejected submission after shutdown");
                Err(PoolError::ShutDown)
            }
            Err(PushRejected::Full { task, capacity }) => {
                debug!(task_id = task.id, capacity, "rejected submission, queue full");
                Err(PoolError::Saturated { capacity })
            }
        }
    }

    /// Stop accepting work, then wait for queued and running tasks.
    ///
    /// Safe to call more than once; concurrent callers all return only after
    /// the drain has finished.
    pub fn shutdown(&self) {
        self.queue.close();
        let mut workers = self.workers.lock().expect("worker list mutex poisoned");
        if workers.is_empty() {
            return;
        }
        debug!(pending = self.queue.len(), "draining worker pool");
        for handle in workers.drain(..) {
            if handle.join().is_err() {
                error!("worker thread panicked outside of a task");
            }
        }
        info!(pool_size = self.size, "worker pool shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.queue.is_closed()
    }

    pub fn pool_size(&self) -> usize {
        self.size
    }

    /// Jobs waiting for a worker (not counting ones already running).
    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
