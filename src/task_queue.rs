//! Thread-safe FIFO task queue with blocking and non-blocking consumers.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use crate::types::Task;

/// Why a push was refused; the task is handed back untouched.
#[derive(Debug)]
pub enum PushRejected {
    /// The queue was closed before the push.
    Closed(Task),
    /// A bounded queue already holds `capacity` tasks.
    Full { task: Task, capacity: usize },
}

/// A synchronized FIFO queue feeding the worker pool.
pub struct TaskQueue {
    inner: Mutex<TaskQueueState>,
    available: Condvar,
    capacity: Option<usize>,
}

struct TaskQueueState {
    queue: VecDeque<Task>,
    closed: bool,
}

impl TaskQueue {
    /// Create an empty queue with no upper bound.
    pub fn new() -> Self {
        Self::with_capacity(None)
    }

    /// Create an empty queue; `Some(n)` refuses pushes once `n` tasks wait.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        let queue = match capacity {
            Some(n) => VecDeque::with_capacity(n),
            None => VecDeque::new(),
        };
        Self {
            inner: Mutex::new(TaskQueueState {
                queue,
                closed: false,
            }),
            available: Condvar::new(),
            capacity,
        }
    }

    /// Push a task; returns the task back if the queue is closed or full.
    pub fn push(&self, task: Task) -> Result<(), PushRejected> {
        let mut guard = self.inner.lock().expect("task queue mutex poisoned");
        if guard.closed {
            return Err(PushRejected::Closed(task));
        }
        if let Some(capacity) = self.capacity {
            if guard.queue.len() >= capacity {
                return Err(PushRejected::Full { task, capacity });
            }
        }
        guard.queue.push_back(task);
        self.available.notify_one();
        Ok(())
    }

    /// Try to pop immediately without blocking.
    pub fn try_pop(&self) -> Option<Task> {
        let mut guard = self.inner.lock().expect("task queue mutex poisoned");
        guard.queue.pop_front()
    }

    /// Block until a task is available or the queue is closed and empty.
    ///
    /// Closing does not discard queued work: consumers keep receiving tasks
    /// until the backlog is drained, then get `None`.
    pub fn pop_blocking_or_closed(&self) -> Option<Task> {
        let mut guard = self.inner.lock().expect("task queue mutex poisoned");
        loop {
            if let Some(task) = guard.queue.pop_front() {
                return Some(task);
            }
            if guard.closed {
                return None;
            }
            // Wait releases the lock and re-acquires it before returning.
            guard = self.available.wait(guard).expect("condvar wait failed");
        }
    }

    /// Close the queue and wake all blocked consumers.
    pub fn close(&self) {
        let mut guard = self.inner.lock().expect("task queue mutex poisoned");
        guard.closed = true;
        self.available.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().expect("task queue mutex poisoned").closed
    }

    /// Current number of queued tasks.
    pub fn len(&self) -> usize {
        let guard = self.inner.lock().expect("task queue mutex poisoned");
        guard.queue.len()
    }
}
