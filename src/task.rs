//! The unit of work: a job trait and the delayed square computation.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::error::TaskError;
use crate::types::{Input, Output};

/// Something the sequential runner or the worker pool can execute.
pub trait Job: Send + 'static {
    type Output: Clone + Send + 'static;

    /// Human-readable label for logs.
    fn describe(&self) -> String {
        "job".to_string()
    }

    fn execute(&self) -> Result<Self::Output, TaskError>;
}

impl<F, T> Job for F
where
    F: Fn() -> Result<T, TaskError> + Send + 'static,
    T: Clone + Send + 'static,
{
    type Output = T;

    fn execute(&self) -> Result<T, TaskError> {
        self()
    }
}

struct InterruptState {
    raised: Mutex<bool>,
    wake: Condvar,
}

/// Shared flag that cuts simulated delays short.
///
/// Clones observe the same flag. Once raised it stays raised.
#[derive(Clone)]
pub struct Interrupt {
    state: Arc<InterruptState>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self {
            state: Arc::new(InterruptState {
                raised: Mutex::new(false),
                wake: Condvar::new(),
            }),
        }
    }

    /// Raise the flag and wake every sleeper.
    pub fn raise(&self) {
        let mut raised = self.state.raised.lock().expect("interrupt mutex poisoned");
        *raised = true;
        self.state.wake.notify_all();
    }

    pub fn is_raised(&self) -> bool {
        *self.state.raised.lock().expect("interrupt mutex poisoned")
    }

    /// Sleep for `delay` unless the flag is raised first.
    pub fn sleep(&self, delay: Duration) -> Result<(), TaskError> {
        let deadline = Instant::now().checked_add(delay);
        let mut raised = self.state.raised.lock().expect("interrupt mutex poisoned");
        loop {
            if *raised {
                return Err(TaskError::Interrupted);
            }
            let Some(deadline) = deadline else {
                raised = self.state.wake.wait(raised).expect("condvar wait failed");
                continue;
            };
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            let (next, _) = self
                .state
                .wake
                .wait_timeout(raised, deadline - now)
                .expect("condvar wait failed");
            raised = next;
        }
    }
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::new()
    }
}

/// Squares its input after a fixed artificial latency.
#[derive(Clone)]
pub struct SquareTask {
    input: Input,
    delay: Duration,
    interrupt: Interrupt,
}

impl SquareTask {
    pub fn new(input: Input, delay: Duration, interrupt: Interrupt) -> Self {
        Self {
            input,
            delay,
            interrupt,
        }
    }
}

impl Job for SquareTask {
    type Output = Output;

    fn describe(&self) -> String {
        format!("square-{}", self.input)
    }

    fn execute(&self) -> Result<Output, TaskError> {
        self.interrupt.sleep(self.delay)?;
        self.input
            .checked_mul(self.input)
            .ok_or_else(|| TaskError::Failed(format!("{} squared overflows", self.input)))
    }
}
