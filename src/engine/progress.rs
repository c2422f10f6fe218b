//! Progress bar on stderr, advanced by the aggregator as results arrive.

use kdam::{Animation, Bar, BarExt};

use crate::utils::config::PackagePaths;

/// Configuration for creating a progress bar
pub struct ProgressBarConfig {
    pub total: usize,
    pub desc: &'static str,
    pub animation: Animation,
}

impl ProgressBarConfig {
    pub fn new(total: usize, desc: &'static str, animation: Animation) -> Self {
        Self {
            total,
            desc,
            animation,
        }
    }
}

/// Bar over the expected result count. Only the aggregator thread touches it, so no lock.
pub struct ResultProgress {
    bar: Bar,
}

impl ResultProgress {
    pub fn new(config: ProgressBarConfig) -> Self {
        let bar = kdam::tqdm!(
            total = config.total,
            desc = config.desc,
            animation = config.animation,
            unit = " files"
        );
        Self { bar }
    }

    /// Bar titled with the package name.
    pub fn for_results(total: usize) -> Self {
        let desc: &'static str = PackagePaths::get().pkg_name();
        Self::new(ProgressBarConfig::new(total, desc, Animation::Classic))
    }

    pub fn advance(&mut self) {
        let _ = self.bar.update(1);
    }

    /// Draw the final state and end the bar's line so the summary starts clean.
    pub fn finish(mut self) {
        let _ = self.bar.refresh();
        eprintln!();
    }
}

/// Build the bar only in verbose mode and when there is something to count.
pub fn setup_progress(verbose: bool, total: usize) -> Option<ResultProgress> {
    (verbose && total > 0).then(|| ResultProgress::for_results(total))
}
