//! Pipeline tuning and the two queues owned by a single pipeline run.

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use std::thread::JoinHandle;

use crate::pipeline::CancelToken;
use crate::utils::config::QueueConsts;
use crate::{Job, JobResult, Opts};

/// Worker count and queue capacity for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineTuning {
    pub num_workers: usize,
    /// Capacity for the job and result queues. `None` means unbounded.
    pub queue_cap: Option<usize>,
}

impl PipelineTuning {
    /// Resolve tuning for `job_count` jobs. More workers than jobs are never spawned, and a bounded
    /// queue never gets more slots than there are jobs (bounded channels allocate every slot up front).
    pub fn resolve(opts: &Opts, job_count: usize, available_workers: usize) -> Self {
        let max_useful = job_count.max(1);
        let requested = opts.num_workers.unwrap_or(available_workers).max(1);
        let num_workers = requested.min(max_useful);
        let queue_cap = match opts.queue_cap {
            Some(0) => None,
            Some(cap) => Some(cap.min(max_useful)),
            None => Some(
                num_workers
                    .saturating_mul(QueueConsts::DEFAULT_CAP_PER_WORKER)
                    .min(max_useful),
            ),
        };
        Self {
            num_workers,
            queue_cap,
        }
    }
}

/// Job queue (1 producer, W consumers) and result queue (W producers, 1 consumer).
/// Dispatcher gets job_tx; workers get job_rx and result_tx; the aggregator gets result_rx.
pub struct PipelineChannels<D> {
    pub job_tx: Sender<Job>,
    pub job_rx: Receiver<Job>,
    pub result_tx: Sender<JobResult<D>>,
    pub result_rx: Receiver<JobResult<D>>,
}

pub fn create_pipeline_channels<D>(queue_cap: Option<usize>) -> PipelineChannels<D> {
    let (job_tx, job_rx) = match queue_cap {
        Some(cap) => bounded::<Job>(cap),
        None => unbounded::<Job>(),
    };
    let (result_tx, result_rx) = match queue_cap {
        Some(cap) => bounded::<JobResult<D>>(cap),
        None => unbounded::<JobResult<D>>(),
    };
    PipelineChannels {
        job_tx,
        job_rx,
        result_tx,
        result_rx,
    }
}

/// Handles returned by [`run_pipeline`](crate::pipeline::run_pipeline): the aggregator reads
/// `result_rx` and the caller joins the threads once it is done.
/// `expected` is the number of jobs dispatched, i.e. how many results the aggregator must see.
pub struct PipelineHandles<D> {
    pub result_rx: Receiver<JobResult<D>>,
    pub expected: usize,
    pub dispatch_handle: JoinHandle<usize>,
    pub worker_handles: Vec<JoinHandle<()>>,
    pub cancel: CancelToken,
}
