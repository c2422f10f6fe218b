//! fanhash CLI: hash files concurrently, one output line per file in completion order.

use anyhow::Result;
use clap::Parser;
use fanhash::engine::{Cli, handle_run};
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
