//! Single-assignment result slot with a blocking read side.
//!
//! [`channel`] creates a linked pair: the [`Resolver`] travels with the task
//! into a worker, the [`ResultHandle`] stays with the submitter.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use tracing::error;

use crate::error::{GetError, ResolveError, TaskError};

struct Shared<T> {
    slot: Mutex<Option<Result<T, TaskError>>>,
    resolved: Condvar,
}

impl<T> Shared<T> {
    fn resolve(&self, outcome: Result<T, TaskError>) -> Result<(), ResolveError> {
        let mut guard = self.slot.lock().expect("result slot mutex poisoned");
        if guard.is_some() {
            return Err(ResolveError::AlreadyResolved);
        }
        *guard = Some(outcome);
        self.resolved.notify_all();
        Ok(())
    }
}

/// Read side of a submitted task's outcome.
pub struct ResultHandle<T> {
    shared: Arc<Shared<T>>,
}

/// Write side of a submitted task's outcome.
///
/// Dropping a resolver that never resolved marks the handle
/// [`TaskError::Abandoned`] so readers are never left blocked.
pub struct Resolver<T> {
    shared: Arc<Shared<T>>,
    done: bool,
}

/// Create a pending handle and the resolver that completes it.
pub fn channel<T>() -> (Resolver<T>, ResultHandle<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(None),
        resolved: Condvar::new(),
    });
    (
        Resolver {
            shared: Arc::clone(&shared),
            done: false,
        },
        ResultHandle { shared },
    )
}

impl<T> Resolver<T> {
    /// Store the outcome and wake every blocked reader.
    pub fn resolve(&mut self, outcome: Result<T, TaskError>) -> Result<(), ResolveError> {
        let result = self.shared.resolve(outcome);
        match &result {
            Ok(()) => self.done = true,
            Err(ResolveError::AlreadyResolved) => {
                error!("attempted to resolve a result handle twice");
            }
        }
        result
    }
}

impl<T> Drop for Resolver<T> {
    fn drop(&mut self) {
        if !self.done {
            let _ = self.shared.resolve(Err(TaskError::Abandoned));
        }
    }
}

impl<T: Clone> ResultHandle<T> {
    /// Block until the task resolves, then return its outcome.
    ///
    /// Calling again after resolution returns the same stored outcome.
    pub fn get(&self) -> Result<T, TaskError> {
        let mut guard = self.shared.slot.lock().expect("result slot mutex poisoned");
        loop {
            if let Some(outcome) = guard.as_ref() {
                return outcome.clone();
            }
            guard = self
                .shared
                .resolved
                .wait(guard)
                .expect("condvar wait failed");
        }
    }

    /// Like [`get`](Self::get) but gives up after `timeout`.
    ///
    /// A timeout too large to represent as a deadline waits indefinitely.
    pub fn get_timeout(&self, timeout: Duration) -> Result<T, GetError> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.get().map_err(GetError::from);
        };
        let mut guard = self.shared.slot.lock().expect("result slot mutex poisoned");
        loop {
            if let Some(outcome) = guard.as_ref() {
                return outcome.clone().map_err(GetError::from);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(GetError::TimedOut(timeout));
            }
            let (next, _) = self
                .shared
                .resolved
                .wait_timeout(guard, deadline - now)
                .expect("condvar wait failed");
            guard = next;
        }
    }
}

impl<T> ResultHandle<T> {
    /// Whether the outcome is already available.
    pub fn is_resolved(&self) -> bool {
        self.shared
            .slot
            .lock()
            .expect("result slot mutex poisoned")
            .is_some()
    }
}
