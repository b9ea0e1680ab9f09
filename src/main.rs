//! Bitonic Pool
//!
//! Sorts the integers given on the command line with the pooled bitonic network
//! and prints them as `[a, b, c, ...]`.
//!
//! ```text
//! bitonic-pool 4 2 1 3            # [1, 2, 3, 4]
//! bitonic-pool -w 8 --descending -- 8 -1 6 5
//! ```

use std::time::Duration;

use anyhow::{bail, Result};
use bitonic_pool::config::{DEFAULT_SHUTDOWN_TIMEOUT, DEFAULT_WORKERS};
use bitonic_pool::math_utils::is_power_of_two;
use bitonic_pool::{sort, Polarity, SortConfig};
use clap::Parser;
use env_logger::Env;
use log::info;

#[derive(Parser, Debug)]
#[command(version, about = "Parallel bitonic sort on a bounded worker pool")]
struct Args {
    /// Values to sort; the count must be a power of two
    #[arg(required = true, allow_negative_numbers = true)]
    values: Vec<i32>,

    /// Number of worker threads
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Sort into descending order
    #[arg(short, long)]
    descending: bool,

    /// Seconds the pool may take to shut down after the last round
    #[arg(long, default_value_t = DEFAULT_SHUTDOWN_TIMEOUT.as_secs())]
    timeout_secs: u64,
}

impl Args {
    fn config(&self) -> SortConfig {
        let polarity = if self.descending {
            Polarity::Descending
        } else {
            Polarity::Ascending
        };
        SortConfig::default()
            .with_workers(self.workers)
            .with_polarity(polarity)
            .with_shutdown_timeout(Duration::from_secs(self.timeout_secs))
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    if !is_power_of_two(args.values.len() as i64) {
        bail!("Input must have a length that is a power of 2, got {}", args.values.len());
    }

    let config = args.config();
    let mut data = args.values;
    let report = sort(&mut data, &config)?;
    info!(
        "{} rounds, {} tasks on {} workers",
        report.rounds,
        report.tasks,
        config.workers
    );

    println!("{:?}", data);
    Ok(())
}
