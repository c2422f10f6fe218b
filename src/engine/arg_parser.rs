use clap::Parser;
use std::path::PathBuf;

use crate::engine::output::OutputFormat;

/// Hash files concurrently and print one line per file as each finishes.
#[derive(Clone, Debug, Parser)]
#[command(name = "fanhash", version)]
#[command(about = "Hash files with a pool of workers; results print in completion order.")]
pub struct Cli {
    /// Files to hash. Results are printed in the order workers finish them.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Worker count. Default: available parallelism, capped by the open-file limit.
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Job and result queue capacity. 0 = unbounded. Default: 4 per worker.
    #[arg(long, short = 'q')]
    pub queue_cap: Option<usize>,

    /// Stop waiting for results after this many seconds.
    #[arg(long, short = 't', value_parser = clap::value_parser!(u64))]
    pub timeout: Option<u64>,

    /// Output format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Hash the files under directory arguments instead of treating directories as inputs.
    #[arg(long, short = 'r', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub recursive: Option<bool>,

    /// Exit non-zero if any file could not be read.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub strict: Option<bool>,

    /// Verbose output: debug logs and a progress bar on stderr.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
