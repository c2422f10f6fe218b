use anyhow::Result;
use log::{debug, warn};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::engine::hashing::{ByteSource, Digester};
use crate::pipeline::{self, Aggregator, CancelToken, PipelineHandles, PipelineTuning};
use crate::utils::config::WorkerThreadLimits;
use crate::{Job, JobResult, Opts, Summary};

/// Start the dispatch + worker pipeline. Returns the result receiver and handles; the caller
/// drives an [`Aggregator`] over `result_rx` and must join the threads when done.
pub fn run_pipeline<S, D>(
    jobs: Vec<Job>,
    source: Arc<S>,
    digester: Arc<D>,
    tuning: &PipelineTuning,
    cancel: CancelToken,
) -> Result<PipelineHandles<D::Output>>
where
    S: ByteSource + 'static,
    D: Digester + 'static,
{
    let expected = jobs.len();
    let channels = pipeline::create_pipeline_channels::<D::Output>(tuning.queue_cap);

    let worker_handles = pipeline::spawn_hash_workers(
        channels.job_rx,
        &channels.result_tx,
        source,
        digester,
        tuning.num_workers,
        &cancel,
    )?;

    // Dropping the last sender closes the result queue once every worker exits.
    drop(channels.result_tx);

    let dispatch_handle = pipeline::spawn_dispatch_thread(channels.job_tx, jobs, cancel.clone())?;

    Ok(PipelineHandles {
        result_rx: channels.result_rx,
        expected,
        dispatch_handle,
        worker_handles,
        cancel,
    })
}

/// Join dispatcher and workers. The result receiver must already be dropped so no worker is
/// left blocked on a full result queue.
pub fn shutdown_pipeline_handles(
    dispatch_handle: JoinHandle<usize>,
    worker_handles: Vec<JoinHandle<()>>,
) -> Result<usize> {
    let dispatched = dispatch_handle
        .join()
        .map_err(|_| anyhow::anyhow!("dispatch thread panicked"))?;
    let panicked = worker_handles
        .into_iter()
        .map(JoinHandle::join)
        .filter(|r| r.is_err())
        .count();
    if panicked > 0 {
        warn!("{} hash worker(s) panicked", panicked);
    }
    Ok(dispatched)
}

/// Main orchestrator: hash every job through the pipeline, calling `on_result` for each result in arrival order.
/// Jobs → job queue → workers (read + digest) → result queue → aggregator → `on_result`.
pub fn hash_jobs<S, D, F>(
    jobs: Vec<Job>,
    source: Arc<S>,
    digester: Arc<D>,
    opts: &Opts,
    cancel: CancelToken,
    on_result: F,
) -> Result<Summary>
where
    S: ByteSource + 'static,
    D: Digester + 'static,
    F: FnMut(&JobResult<D::Output>) -> Result<()>,
{
    let tuning = PipelineTuning::resolve(opts, jobs.len(), WorkerThreadLimits::current().max_workers());
    debug!("Pipeline tuning: {:?}", tuning);

    let PipelineHandles {
        result_rx,
        expected,
        dispatch_handle,
        worker_handles,
        cancel,
    } = run_pipeline(jobs, source, digester, &tuning, cancel)?;

    let summary = Aggregator::new(expected)
        .with_timeout(opts.timeout)
        .run(&result_rx, &cancel, on_result);

    drop(result_rx);
    let dispatched = shutdown_pipeline_handles(dispatch_handle, worker_handles)?;
    debug!("dispatched {} of {} jobs", dispatched, expected);
    summary
}
