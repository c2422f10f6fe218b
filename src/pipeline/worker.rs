use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use log::debug;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::engine::hashing::{ByteSource, Digester};
use crate::pipeline::CancelToken;
use crate::{Job, JobResult, ReadFailure};

/// Read one job's bytes and digest them. A read failure becomes the job's outcome.
pub fn process_job<S, D>(job: Job, source: &S, digester: &D) -> JobResult<D::Output>
where
    S: ByteSource + ?Sized,
    D: Digester + ?Sized,
{
    let outcome = source
        .read(&job)
        .map(|bytes| digester.digest(bytes.as_ref()))
        .map_err(ReadFailure::from);
    if let Err(e) = &outcome {
        debug!("read failed for {}: {}", job, e);
    }
    JobResult { job, outcome }
}

/// Single hash worker: take jobs from job_rx until it closes, send one result per job on result_tx.
/// Checks `cancel` between jobs, so an in-flight job is always finished first.
fn hash_worker_loop<S, D>(
    job_rx: Receiver<Job>,
    result_tx: Sender<JobResult<D::Output>>,
    source: Arc<S>,
    digester: Arc<D>,
    cancel: CancelToken,
) where
    S: ByteSource,
    D: Digester,
{
    while !cancel.is_cancelled() {
        let Ok(job) = job_rx.recv() else {
            break;
        };
        let result = process_job(job, &*source, &*digester);
        if result_tx.send(result).is_err() {
            break;
        }
    }
    drop(result_tx);
}

/// Spawn `num_workers` hash workers sharing job_rx. Caller must drop its own result sender after this
/// so the result queue closes once every worker has exited.
pub fn spawn_hash_workers<S, D>(
    job_rx: Receiver<Job>,
    result_tx: &Sender<JobResult<D::Output>>,
    source: Arc<S>,
    digester: Arc<D>,
    num_workers: usize,
    cancel: &CancelToken,
) -> Result<Vec<JoinHandle<()>>>
where
    S: ByteSource + 'static,
    D: Digester + 'static,
{
    (0..num_workers)
        .map(|worker_id| {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let source = Arc::clone(&source);
            let digester = Arc::clone(&digester);
            let cancel = cancel.clone();
            thread::Builder::new()
                .name(format!("{}-worker-{}", env!("CARGO_PKG_NAME"), worker_id))
                .spawn(move || hash_worker_loop(job_rx, result_tx, source, digester, cancel))
                .with_context(|| format!("spawn hash worker {worker_id}"))
        })
        .collect()
}
