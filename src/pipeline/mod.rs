//! Pipeline components: queues, dispatcher, worker pool, aggregator.

pub mod aggregate;
pub mod cancel;
pub mod context;
pub mod dispatch;
pub mod orchestrator;
pub mod worker;

pub use aggregate::{Aggregator, AggregatorState};
pub use cancel::CancelToken;
pub use context::{PipelineChannels, PipelineHandles, PipelineTuning, create_pipeline_channels};
pub use dispatch::{run_dispatch_loop, spawn_dispatch_thread};
pub use orchestrator::{hash_jobs, run_pipeline, shutdown_pipeline_handles};
pub use worker::{process_job, spawn_hash_workers};
