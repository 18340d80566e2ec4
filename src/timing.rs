//! Wall-clock and CPU timing around a unit of work.

use std::time::{Duration, Instant};

use tracing::info;

/// Best-effort CPU user/system time snapshot (seconds) on Unix platforms.
#[cfg(unix)]
fn cpu_times_seconds() -> Option<(f64, f64)> {
    use libc::{RUSAGE_SELF, getrusage, rusage};
    // SAFETY: rusage is plain old data; an all-zero value is valid.
    let mut usage: rusage = unsafe { std::mem::zeroed() };
    let rc = unsafe { getrusage(RUSAGE_SELF, &mut usage) };
    if rc != 0 {
        return None;
    }
    let user = usage.ru_utime.tv_sec as f64 + (usage.ru_utime.tv_usec as f64 / 1_000_000.0);
    let sys = usage.ru_stime.tv_sec as f64 + (usage.ru_stime.tv_usec as f64 / 1_000_000.0);
    Some((user, sys))
}

/// Stub on non-Unix platforms.
#[cfg(not(unix))]
fn cpu_times_seconds() -> Option<(f64, f64)> {
    None
}

/// Elapsed time of one labelled phase.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingRecord {
    pub label: String,
    pub elapsed: Duration,
    pub cpu_user_s: Option<f64>,
    pub cpu_sys_s: Option<f64>,
}

impl TimingRecord {
    /// `"<label> elapsed: <seconds> seconds"` with two decimals.
    pub fn line(&self) -> String {
        format!("{} elapsed: {:.2} seconds", self.label, self.elapsed.as_secs_f64())
    }
}

/// Start instant plus the CPU snapshot taken with it.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
    cpu_start: Option<(f64, f64)>,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            cpu_start: cpu_times_seconds(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn stop(self, label: impl Into<String>) -> TimingRecord {
        let elapsed = self.start.elapsed();
        let (cpu_user_s, cpu_sys_s) = match (self.cpu_start, cpu_times_seconds()) {
            (Some((user_start, sys_start)), Some((user_end, sys_end))) => {
                (Some(user_end - user_start), Some(sys_end - sys_start))
            }
            _ => (None, None),
        };
        TimingRecord {
            label: label.into(),
            elapsed,
            cpu_user_s,
            cpu_sys_s,
        }
    }
}

/// Logs how long its scope lasted when dropped, including on unwind.
pub struct TimingGuard<'a> {
    label: &'a str,
    stopwatch: Stopwatch,
}

impl<'a> TimingGuard<'a> {
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            stopwatch: Stopwatch::start(),
        }
    }
}

impl Drop for TimingGuard<'_> {
    fn drop(&mut self) {
        info!(
            phase = self.label,
            elapsed_ms = self.stopwatch.elapsed().as_millis() as u64,
            "phase finished"
        );
    }
}

/// Run `work` between a start and stop of a fresh stopwatch.
pub fn timed<T>(label: &str, work: impl FnOnce() -> T) -> (T, TimingRecord) {
    let _guard = TimingGuard::new(label);
    let stopwatch = Stopwatch::start();
    let output = work();
    (output, stopwatch.stop(label))
}
