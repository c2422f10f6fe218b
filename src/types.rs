//! Public and internal types for the fanhash API and pipeline.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::output::OutputFormat;

/// One unit of dispatched work: the identifier of a file to hash.
///
/// Immutable once created. The dispatcher hands each job to exactly one worker.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Job {
    pub path: PathBuf,
}

impl Job {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Why the byte source could not produce content for a job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadFailure {
    pub kind: io::ErrorKind,
    pub message: String,
}

impl From<io::Error> for ReadFailure {
    fn from(e: io::Error) -> Self {
        ReadFailure {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

impl fmt::Display for ReadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of one job: the digest, or the reason the bytes could not be read.
pub type Outcome<D> = std::result::Result<D, ReadFailure>;

/// What a worker sends to the aggregator: the job it took and what came of it.
#[derive(Clone, Debug)]
pub struct JobResult<D> {
    pub job: Job,
    pub outcome: Outcome<D>,
}

impl<D> JobResult<D> {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// How the aggregator left its wait loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// All expected results were received.
    Done,
    /// The cancellation token was raised with `remaining` results outstanding.
    Cancelled { remaining: usize },
    /// The deadline passed with `remaining` results outstanding.
    TimedOut { remaining: usize },
}

impl Completion {
    pub fn is_done(&self) -> bool {
        matches!(self, Completion::Done)
    }
}

/// Counts reported by the aggregator once it stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    /// Number of jobs dispatched (the expected result count).
    pub expected: usize,
    /// Results with a digest.
    pub hashed: usize,
    /// Results carrying a read failure.
    pub failed: usize,
    pub completion: Completion,
}

impl Summary {
    /// Total results emitted.
    pub fn emitted(&self) -> usize {
        self.hashed + self.failed
    }
}

/// Lib-only options for [`hash_files`](crate::hash_files).
#[derive(Clone, Debug, Default)]
pub struct HashOpts {
    /// Worker count. When None, derived from available threads and the FD limit.
    pub num_workers: Option<usize>,
    /// Job/result queue capacity. `Some(0)` means unbounded; None uses the per-worker default.
    pub queue_cap: Option<usize>,
    /// Stop waiting for results after this long.
    pub timeout: Option<Duration>,
}

impl From<&HashOpts> for Opts {
    fn from(o: &HashOpts) -> Self {
        Opts {
            num_workers: o.num_workers,
            queue_cap: o.queue_cap,
            timeout: o.timeout,
            ..Default::default()
        }
    }
}

/// Full options (CLI). Use [`HashOpts`] for lib.
#[derive(Clone, Debug, Default)]
pub struct Opts {
    /// Worker count. When None, derived from available threads and the FD limit.
    pub num_workers: Option<usize>,
    /// Job/result queue capacity. `Some(0)` means unbounded.
    pub queue_cap: Option<usize>,
    /// Stop waiting for results after this long.
    pub timeout: Option<Duration>,
    /// Expand directory arguments into the files beneath them.
    pub recursive: bool,
    /// Exit non-zero when any job failed.
    pub strict: bool,
    /// Debug logging and a progress bar on stderr.
    pub verbose: bool,
    pub format: OutputFormat,
}
