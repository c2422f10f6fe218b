//! Aggregator: the single consumer of the result queue and the only place results are emitted.

use anyhow::Result;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::debug;
use std::time::{Duration, Instant};

use crate::pipeline::CancelToken;
use crate::utils::config::QueueConsts;
use crate::{Completion, JobResult, Summary};

/// `Awaiting { remaining }` counts down one per result; `Done` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggregatorState {
    Awaiting { remaining: usize },
    Done,
}

impl AggregatorState {
    fn start(expected: usize) -> Self {
        if expected == 0 {
            AggregatorState::Done
        } else {
            AggregatorState::Awaiting {
                remaining: expected,
            }
        }
    }

    pub fn remaining(&self) -> usize {
        match self {
            AggregatorState::Awaiting { remaining } => *remaining,
            AggregatorState::Done => 0,
        }
    }
}

/// Consumes exactly `expected` results, emitting each in arrival order.
pub struct Aggregator {
    expected: usize,
    state: AggregatorState,
    hashed: usize,
    failed: usize,
    deadline: Option<Instant>,
    poll_interval: Duration,
}

impl Aggregator {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            state: AggregatorState::start(expected),
            hashed: 0,
            failed: 0,
            deadline: None,
            poll_interval: QueueConsts::CANCEL_POLL_INTERVAL,
        }
    }

    /// Give up waiting once `timeout` has elapsed from now. A timeout past the end of the
    /// representable clock means no deadline.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn state(&self) -> AggregatorState {
        self.state
    }

    /// Record one received result. Receiving in `Done` is a caller bug and is ignored.
    pub fn accept<D>(&mut self, result: &JobResult<D>) {
        if let AggregatorState::Awaiting { remaining } = self.state {
            if result.is_ok() {
                self.hashed += 1;
            } else {
                self.failed += 1;
            }
            self.state = match remaining - 1 {
                0 => AggregatorState::Done,
                remaining => AggregatorState::Awaiting { remaining },
            };
        }
    }

    fn summary(&self, completion: Completion) -> Summary {
        Summary {
            expected: self.expected,
            hashed: self.hashed,
            failed: self.failed,
            completion,
        }
    }

    /// Receive results until `expected` have arrived, calling `emit` on each as it arrives.
    ///
    /// Returns early with [`Completion::Cancelled`] or [`Completion::TimedOut`] and raises `cancel`
    /// so the dispatcher and workers stop too. Fails if `emit` fails or if the result queue closes
    /// before every result arrived (a worker died).
    pub fn run<D, F>(
        mut self,
        result_rx: &Receiver<JobResult<D>>,
        cancel: &CancelToken,
        mut emit: F,
    ) -> Result<Summary>
    where
        F: FnMut(&JobResult<D>) -> Result<()>,
    {
        while let AggregatorState::Awaiting { remaining } = self.state {
            if cancel.is_cancelled() {
                debug!("aggregator: cancelled with {} results outstanding", remaining);
                return Ok(self.summary(Completion::Cancelled { remaining }));
            }
            let wait = match self.deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        cancel.cancel();
                        debug!("aggregator: timed out with {} results outstanding", remaining);
                        return Ok(self.summary(Completion::TimedOut { remaining }));
                    }
                    self.poll_interval.min(deadline - now)
                }
                None => self.poll_interval,
            };
            match result_rx.recv_timeout(wait) {
                Ok(result) => {
                    if let Err(e) = emit(&result) {
                        cancel.cancel();
                        return Err(e);
                    }
                    self.accept(&result);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) if cancel.is_cancelled() => {
                    return Ok(self.summary(Completion::Cancelled { remaining }));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    cancel.cancel();
                    anyhow::bail!(
                        "result queue closed with {} of {} results missing; a worker exited abnormally",
                        remaining,
                        self.expected
                    );
                }
            }
        }
        debug!(
            "aggregator: done, {} hashed, {} failed",
            self.hashed, self.failed
        );
        Ok(self.summary(Completion::Done))
    }
}
