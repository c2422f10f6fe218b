//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::sync::OnceLock;
use std::time::Duration;

use crate::utils::fd_limit::max_workers_by_fd_limit;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Per-directory settings file, e.g. `.fanhash.toml`.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Worker threads ----

/// Thread limits for sizing the worker pool.
/// Use [`WorkerThreadLimits::current()`] to fill `all_threads` from rayon; the rest are const.
#[derive(Clone, Copy, Debug)]
pub struct WorkerThreadLimits {
    /// Available threads (from rayon); set by [`WorkerThreadLimits::current()`].
    pub all_threads: usize,
    /// Minimum worker count.
    pub floor: usize,
    /// Cap derived from the process FD limit, if any.
    pub fd_cap: Option<usize>,
}

impl Default for WorkerThreadLimits {
    fn default() -> Self {
        Self {
            all_threads: 0, // use current() to set from rayon
            floor: Self::FLOOR_THREADS,
            fd_cap: None,
        }
    }
}

impl WorkerThreadLimits {
    pub const FLOOR_THREADS: usize = 1;

    /// Build limits with `all_threads` from `rayon::current_num_threads()` and the FD cap.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            fd_cap: max_workers_by_fd_limit(),
            ..Self::default()
        }
    }

    /// Default worker count: available threads, capped by the FD budget, at least `floor`.
    pub fn max_workers(&self) -> usize {
        let n = match self.fd_cap {
            Some(cap) if cap < self.all_threads => {
                log::debug!(
                    "Capping workers {} -> {} (FD limit ~80%)",
                    self.all_threads,
                    cap
                );
                cap
            }
            _ => self.all_threads,
        };
        n.max(self.floor)
    }
}

// ---- Queues ----

/// Job/result queue sizing and aggregator polling.
pub struct QueueConsts;

impl QueueConsts {
    /// Default queue capacity per worker. Small enough that a slow aggregator throttles workers.
    pub const DEFAULT_CAP_PER_WORKER: usize = 4;
    /// How often the aggregator wakes to check for cancellation while the result queue is empty.
    pub const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(50);
}

// ---- Hashing ----

/// Hashing I/O thresholds and buffer sizes.
pub struct HashingConsts;

impl HashingConsts {
    /// Input size above which blake3 splits hashing across the rayon pool (bytes). 100 MB.
    pub const RAYON_HASH_THRESHOLD: u64 = 100 * 1024 * 1024;
    /// Buffer size for reading files that cannot be mapped (bytes). 1 MB.
    pub const HASH_READ_CHUNK_SIZE: usize = 1024 * 1024;
}
