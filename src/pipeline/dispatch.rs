//! Dispatcher: feeds jobs into the job queue, then closes it.

use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use log::debug;
use std::thread::{self, JoinHandle};

use crate::Job;
use crate::pipeline::CancelToken;

pub fn spawn_dispatch_thread(
    job_tx: Sender<Job>,
    jobs: Vec<Job>,
    cancel: CancelToken,
) -> Result<JoinHandle<usize>> {
    thread::Builder::new()
        .name(format!("{}-dispatch", env!("CARGO_PKG_NAME")))
        .spawn(move || run_dispatch_loop(job_tx, jobs, &cancel))
        .context("spawn dispatch thread")
}

/// Enqueue each job exactly once, in order. Blocks while a bounded queue is full.
/// Stops early when `cancel` is raised or every worker has gone away.
/// Drops `job_tx` when done so workers see the queue close. Returns the count of jobs sent.
pub fn run_dispatch_loop<I>(job_tx: Sender<Job>, jobs: I, cancel: &CancelToken) -> usize
where
    I: IntoIterator<Item = Job>,
{
    let mut count = 0_usize;
    for job in jobs {
        if cancel.is_cancelled() {
            debug!("dispatch: cancelled after {} jobs", count);
            break;
        }
        if job_tx.send(job).is_err() {
            debug!("dispatch: all workers gone after {} jobs", count);
            break;
        }
        count += 1;
    }
    drop(job_tx);
    count
}
