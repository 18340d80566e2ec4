//! Comparison, single-path, and sweep runners behind the CLI.

use tracing::{debug, info};

use crate::collector::{self, ItemOutcome, Report};
use crate::config::RunConfig;
use crate::error::PoolError;
use crate::pool::WorkerPool;
use crate::result_handle::ResultHandle;
use crate::sequential;
use crate::task::{Interrupt, SquareTask};
use crate::timing::{self, TimingRecord};
use crate::types::{Input, Output};

pub const SEQUENTIAL_LABEL: &str = "sequential";
pub const PARALLEL_LABEL: &str = "parallel";

/// Report and timing of one execution path.
#[derive(Debug, Clone)]
pub struct PhaseRun {
    pub report: Report,
    pub timing: TimingRecord,
}

/// Both paths over the same inputs.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub sequential: PhaseRun,
    pub parallel: PhaseRun,
}

impl Comparison {
    /// Sequential wall-clock divided by pooled wall-clock.
    pub fn speedup(&self) -> f64 {
        let parallel = self.parallel.timing.elapsed.as_secs_f64();
        if parallel > 0.0 {
            self.sequential.timing.elapsed.as_secs_f64() / parallel
        } else {
            0.0
        }
    }
}

/// Time the sequential runner over `config.inputs()`.
pub fn sequential_phase<F>(config: &RunConfig, interrupt: &Interrupt, on_item: F) -> PhaseRun
where
    F: FnMut(&ItemOutcome),
{
    let jobs = config
        .inputs()
        .into_iter()
        .map(|input| (input, SquareTask::new(input, config.delay(), interrupt.clone())));
    let (report, timing) = timing::timed(SEQUENTIAL_LABEL, || {
        sequential::run_with(SEQUENTIAL_LABEL, jobs, on_item)
    });
    PhaseRun { report, timing }
}

/// Submit every input, retrying against the oldest outstanding handle when a
/// bounded queue is saturated.
fn submit_all(
    pool: &WorkerPool,
    inputs: &[Input],
    config: &RunConfig,
    interrupt: &Interrupt,
) -> Result<Vec<ResultHandle<Output>>, PoolError> {
    let mut handles: Vec<ResultHandle<Output>> = Vec::with_capacity(inputs.len());
    let mut next_to_wait = 0usize;
    for &input in inputs {
        let task = SquareTask::new(input, config.delay(), interrupt.clone());
        loop {
            match pool.submit(task.clone()) {
                Ok(handle) => {
                    handles.push(handle);
                    break;
                }
                Err(PoolError::Saturated { capacity }) if next_to_wait < handles.len() => {
                    debug!(input, capacity, "queue saturated, waiting on oldest task");
                    // Outcome is read again by the collector; get() is idempotent.
                    let _ = handles[next_to_wait].get();
                    next_to_wait += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
    Ok(handles)
}

/// Time pool startup, submission, and the full in-order drain.
pub fn parallel_phase<F>(
    config: &RunConfig,
    interrupt: &Interrupt,
    on_item: F,
) -> Result<PhaseRun, PoolError>
where
    F: FnMut(&ItemOutcome),
{
    let inputs = config.inputs();
    let (report, timing) = timing::timed(PARALLEL_LABEL, || -> Result<Report, PoolError> {
        let pool = WorkerPool::from_config(config)?;
        let handles = submit_all(&pool, &inputs, config, interrupt)?;
        info!(submitted = handles.len(), queued = pool.queued(), "all tasks submitted");
        let report = collector::collect_with(PARALLEL_LABEL, &inputs, handles, on_item);
        pool.shutdown();
        Ok(report)
    });
    Ok(PhaseRun {
        report: report?,
        timing,
    })
}

/// Progress notifications from [`compare`].
#[derive(Debug)]
pub enum CompareEvent<'a> {
    PhaseStarted(&'a str),
    Item(&'a str, &'a ItemOutcome),
    PhaseFinished(&'a PhaseRun),
}

/// Run the sequential path, then the pooled path.
pub fn compare<F>(
    config: &RunConfig,
    interrupt: &Interrupt,
    mut on_event: F,
) -> Result<Comparison, PoolError>
where
    F: FnMut(CompareEvent<'_>),
{
    on_event(CompareEvent::PhaseStarted(SEQUENTIAL_LABEL));
    let sequential = sequential_phase(config, interrupt, |item| {
        on_event(CompareEvent::Item(SEQUENTIAL_LABEL, item))
    });
    on_event(CompareEvent::PhaseFinished(&sequential));

    on_event(CompareEvent::PhaseStarted(PARALLEL_LABEL));
    let parallel = parallel_phase(config, interrupt, |item| {
        on_event(CompareEvent::Item(PARALLEL_LABEL, item))
    })?;
    on_event(CompareEvent::PhaseFinished(&parallel));

    Ok(Comparison {
        sequential,
        parallel,
    })
}

fn print_item(label: &str, item: &ItemOutcome) {
    println!("{}", item.line(label));
}

fn print_phase_header(label: &str, config: &RunConfig) {
    if label == PARALLEL_LABEL {
        println!("{label} processing (pool_size={}):", config.pool_size);
    } else {
        println!("{label} processing:");
    }
}

/// Default CLI mode: both paths with per-item lines and timings.
pub fn run_compare(config: &RunConfig) -> Result<Comparison, PoolError> {
    let interrupt = Interrupt::new();
    let comparison = compare(config, &interrupt, |event| match event {
        CompareEvent::PhaseStarted(label) => print_phase_header(label, config),
        CompareEvent::Item(label, item) => print_item(label, item),
        CompareEvent::PhaseFinished(run) => println!("{}", run.timing.line()),
    })?;
    println!("speedup: {:.2}x", comparison.speedup());
    Ok(comparison)
}

/// Sequential path only.
pub fn run_sequential(config: &RunConfig) -> PhaseRun {
    let interrupt = Interrupt::new();
    print_phase_header(SEQUENTIAL_LABEL, config);
    let run = sequential_phase(config, &interrupt, |item| print_item(SEQUENTIAL_LABEL, item));
    println!("{}", run.timing.line());
    run
}

/// Pooled path only.
pub fn run_parallel(config: &RunConfig) -> Result<PhaseRun, PoolError> {
    let interrupt = Interrupt::new();
    print_phase_header(PARALLEL_LABEL, config);
    let run = parallel_phase(config, &interrupt, |item| print_item(PARALLEL_LABEL, item))?;
    println!("{}", run.timing.line());
    println!("processing completed");
    Ok(run)
}

/// One row of the pool-size sweep.
#[derive(Debug, Clone)]
pub struct SweepRow {
    pub pool_size: usize,
    pub tasks: usize,
    pub delay_ms: u64,
    pub elapsed_ms: f64,
    pub throughput: f64,
    pub expected_ms: f64,
    pub speedup: f64,
    pub cpu_user_s: Option<f64>,
    pub cpu_sys_s: Option<f64>,
    pub failed: usize,
}

pub const SWEEP_HEADER: &str = "pool_size,tasks,delay_ms,elapsed_ms,throughput_tasks_per_s,expected_ms,speedup,cpu_user_s,cpu_sys_s,failed";

impl SweepRow {
    pub fn csv(&self) -> String {
        let cpu_user = self
            .cpu_user_s
            .map(|v| format!("{v:.4}"))
            .unwrap_or_else(|| "NA".to_string());
        let cpu_sys = self
            .cpu_sys_s
            .map(|v| format!("{v:.4}"))
            .unwrap_or_else(|| "NA".to_string());
        format!(
            "{},{},{},{:.2},{:.2},{:.2},{:.2},{},{},{}",
            self.pool_size,
            self.tasks,
            self.delay_ms,
            self.elapsed_ms,
            self.throughput,
            self.expected_ms,
            self.speedup,
            cpu_user,
            cpu_sys,
            self.failed
        )
    }
}

/// Pooled run for a single pool size, measured against `tasks * delay`.
pub fn sweep_once(config: &RunConfig) -> Result<SweepRow, PoolError> {
    let interrupt = Interrupt::new();
    let run = parallel_phase(config, &interrupt, |_| {})?;
    let elapsed_ms = run.timing.elapsed.as_secs_f64() * 1000.0;
    let sequential_ms = (config.task_count as f64) * (config.delay_ms as f64);
    let throughput = if elapsed_ms > 0.0 {
        (config.task_count as f64) / (elapsed_ms / 1000.0)
    } else {
        0.0
    };
    let speedup = if elapsed_ms > 0.0 {
        sequential_ms / elapsed_ms
    } else {
        0.0
    };
    Ok(SweepRow {
        pool_size: config.pool_size,
        tasks: config.task_count,
        delay_ms: config.delay_ms,
        elapsed_ms,
        throughput,
        expected_ms: config.expected_pooled().as_secs_f64() * 1000.0,
        speedup,
        cpu_user_s: run.timing.cpu_user_s,
        cpu_sys_s: run.timing.cpu_sys_s,
        failed: run.report.failed(),
    })
}

/// Sweep pool sizes and print CSV output.
pub fn run_sweep(base: &RunConfig, pool_sizes: &[usize]) -> Result<Vec<SweepRow>, PoolError> {
    println!("{SWEEP_HEADER}");
    let mut rows = Vec::with_capacity(pool_sizes.len());
    for &pool_size in pool_sizes {
        let config = RunConfig {
            pool_size,
            ..base.clone()
        };
        let row = sweep_once(&config)?;
        println!("{}", row.csv());
        if row.failed > 0 {
            eprintln!("# warning,failed_tasks,{}", row.failed);
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(pool_size: usize, task_count: usize, delay_ms: u64) -> RunConfig {
        RunConfig {
            pool_size,
            task_count,
            delay_ms,
            queue_capacity: None,
        }
    }

    fn values(report: &Report) -> Vec<(Input, Output)> {
        report
            .items
            .iter()
            .map(|item| (item.input, item.result.clone().expect("square")))
            .collect()
    }

    #[test]
    fn both_paths_agree_and_pool_is_faster() {
        let config = config(4, 10, 100);
        let mut order = Vec::new();
        let mut phases = Vec::new();
        let comparison = compare(&config, &Interrupt::new(), |event| match event {
            CompareEvent::PhaseStarted(label) => phases.push(format!("start {label}")),
            CompareEvent::Item(label, item) => order.push((label.to_string(), item.input)),
            CompareEvent::PhaseFinished(run) => phases.push(format!("end {}", run.timing.label)),
        })
        .expect("compare");
        assert_eq!(
            phases,
            vec![
                "start sequential",
                "end sequential",
                "start parallel",
                "end parallel"
            ]
        );

        let expected: Vec<(Input, Output)> = (1..=10).map(|x| (x, x * x)).collect();
        assert_eq!(values(&comparison.sequential.report), expected);
        assert_eq!(values(&comparison.parallel.report), expected);

        let seq_order: Vec<Input> = order
            .iter()
            .filter(|(label, _)| label == SEQUENTIAL_LABEL)
            .map(|(_, input)| *input)
            .collect();
        let par_order: Vec<Input> = order
            .iter()
            .filter(|(label, _)| label == PARALLEL_LABEL)
            .map(|(_, input)| *input)
            .collect();
        assert_eq!(seq_order, config.inputs());
        assert_eq!(par_order, config.inputs());

        let sequential = comparison.sequential.timing.elapsed;
        let parallel = comparison.parallel.timing.elapsed;
        assert!(sequential >= Duration::from_millis(1000));
        // Timing stops after the last handle resolves, not after submission.
        assert!(parallel >= config.expected_pooled());
        assert!(parallel.as_secs_f64() < sequential.as_secs_f64() * 0.6);
        assert!(comparison.speedup() > 1.0);
    }

    #[test]
    fn single_worker_matches_sequential_timing() {
        let config = config(1, 6, 50);
        let run = parallel_phase(&config, &Interrupt::new(), |_| {}).expect("parallel");
        assert!(run.timing.elapsed >= Duration::from_millis(300));
        assert_eq!(run.report.failed(), 0);
    }

    #[test]
    fn bounded_queue_still_completes_every_task() {
        let config = RunConfig {
            queue_capacity: Some(1),
            ..config(2, 8, 10)
        };
        let run = parallel_phase(&config, &Interrupt::new(), |_| {}).expect("parallel");
        let expected: Vec<(Input, Output)> = (1..=8).map(|x| (x, x * x)).collect();
        assert_eq!(values(&run.report), expected);
    }

    #[test]
    fn interrupted_pool_reports_every_item() {
        let interrupt = Interrupt::new();
        interrupt.raise();
        let config = config(2, 4, 5_000);
        let run = parallel_phase(&config, &interrupt, |_| {}).expect("parallel");
        assert_eq!(run.report.inputs(), vec![1, 2, 3, 4]);
        assert_eq!(run.report.failed(), 4);
        assert!(run.timing.elapsed < Duration::from_secs(5));
    }

    #[test]
    fn sweep_row_formats_csv() {
        let row = SweepRow {
            pool_size: 4,
            tasks: 10,
            delay_ms: 500,
            elapsed_ms: 1502.25,
            throughput: 6.657,
            expected_ms: 1500.0,
            speedup: 3.3283,
            cpu_user_s: None,
            cpu_sys_s: Some(0.01),
            failed: 0,
        };
        assert_eq!(
            row.csv(),
            "4,10,500,1502.25,6.66,1500.00,3.33,NA,0.0100,0"
        );
        assert_eq!(SWEEP_HEADER.split(',').count(), row.csv().split(',').count());
    }

    #[test]
    fn sweep_once_reports_pool_size() {
        let row = sweep_once(&config(2, 4, 20)).expect("sweep");
        assert_eq!(row.pool_size, 2);
        assert_eq!(row.tasks, 4);
        assert_eq!(row.failed, 0);
        assert!(row.elapsed_ms >= 40.0);
    }
}
