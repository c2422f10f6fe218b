//! fanhash: concurrent file hashing through a dispatcher, a fixed worker pool and a single aggregator.

pub mod engine;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use log::debug;
use std::path::PathBuf;
use std::sync::Arc;

use engine::hashing::{Blake3Digester, FsSource};
use pipeline::CancelToken;

/// Result alias used by public fanhash API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: blake3-hash every file in `paths` with `opts` and return the results in arrival order.
///
/// - **`on_result: None`** → results are only collected and returned.
/// - **`on_result: Some(f)`** → `f` is also invoked for each result as it arrives (streaming). It runs on the
///   calling thread, which is the aggregator; keep it fast or send to a channel.
///
/// Read failures are per-file outcomes and never make this return `Err`. Pass `cancel: Some(token)` to be able
/// to stop the run from another thread; the returned [`Summary`] then says how many results were not produced.
pub fn hash_files<F>(
    paths: &[PathBuf],
    opts: &HashOpts,
    cancel: Option<CancelToken>,
    mut on_result: Option<F>,
) -> Result<(Vec<JobResult<blake3::Hash>>, Summary)>
where
    F: FnMut(&JobResult<blake3::Hash>),
{
    let opts = Opts::from(opts);
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );

    let jobs: Vec<Job> = paths.iter().cloned().map(Job::new).collect();
    let mut results = Vec::with_capacity(jobs.len());
    let summary = pipeline::hash_jobs(
        jobs,
        Arc::new(FsSource),
        Arc::new(Blake3Digester),
        &opts,
        cancel.unwrap_or_default(),
        |r| {
            if let Some(f) = on_result.as_mut() {
                f(r);
            }
            results.push(r.clone());
            Ok(())
        },
    )?;
    Ok((results, summary))
}
