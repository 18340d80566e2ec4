//! Baseline runner: every job in order on the calling thread.

use tracing::debug;

use crate::collector::{ItemOutcome, Report};
use crate::task::Job;
use crate::types::{Input, Output};

/// Execute each `(input, job)` pair in turn, reporting as each completes.
///
/// A failed or interrupted item is recorded and the run moves on.
pub fn run_with<I, J, F>(label: &str, jobs: I, mut on_item: F) -> Report
where
    I: IntoIterator<Item = (Input, J)>,
    J: Job<Output = Output>,
    F: FnMut(&ItemOutcome),
{
    let mut report = Report::new(label);
    for (input, job) in jobs {
        debug!(task = %job.describe(), "running sequentially");
        let item = ItemOutcome {
            input,
            result: job.execute(),
        };
        on_item(&item);
        report.push(item);
    }
    report
}
