use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use squarepool::config::{Overrides, RunConfig};
use squarepool::{logging, sim};

/// Square numbers on a fixed-size worker pool and compare against a
/// sequential run.
#[derive(Parser, Debug)]
#[command(name = "squarepool", version, about)]
struct Cli {
    #[command(flatten)]
    run: RunArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Path to a TOML config file.
    #[arg(long, global = true, env = "SQUAREPOOL_CONFIG")]
    config: Option<PathBuf>,

    /// Number of worker threads.
    #[arg(long, global = true, env = "SQUAREPOOL_POOL_SIZE")]
    pool_size: Option<usize>,

    /// Inputs run are 1..=tasks.
    #[arg(long, global = true, env = "SQUAREPOOL_TASKS")]
    tasks: Option<usize>,

    /// Artificial per-task latency in milliseconds.
    #[arg(long, global = true, env = "SQUAREPOOL_DELAY_MS")]
    delay_ms: Option<u64>,

    /// Reject submissions once this many jobs are waiting (default: unbounded).
    #[arg(long, global = true, env = "SQUAREPOOL_QUEUE_CAPACITY")]
    queue_capacity: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sequential run followed by the pooled run (default).
    Compare,
    /// Sequential run only.
    Sequential,
    /// Pooled run only.
    Parallel,
    /// Pooled runs over several pool sizes, printed as CSV.
    Sweep {
        /// Comma-separated pool sizes.
        #[arg(long, value_delimiter = ',', default_values_t = [1usize, 2, 4, 8])]
        pool_sizes: Vec<usize>,
    },
}

impl RunArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            pool_size: self.pool_size,
            task_count: self.tasks,
            delay_ms: self.delay_ms,
            queue_capacity: self.queue_capacity,
        }
    }
}

fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();
    let config = RunConfig::load(cli.run.config.as_deref())
        .context("failed to load configuration")?
        .with_overrides(&cli.run.overrides())
        .context("invalid configuration")?;
    info!(?config, "starting");

    match cli.command.unwrap_or(Command::Compare) {
        Command::Compare => {
            sim::run_compare(&config).context("pooled run failed")?;
        }
        Command::Sequential => {
            sim::run_sequential(&config);
        }
        Command::Parallel => {
            sim::run_parallel(&config).context("pooled run failed")?;
        }
        Command::Sweep { pool_sizes } => {
            if pool_sizes.contains(&0) {
                anyhow::bail!("sweep: pool sizes must be > 0");
            }
            sim::run_sweep(&config, &pool_sizes).context("sweep failed")?;
        }
    }
    Ok(())
}
