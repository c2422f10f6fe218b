//! Turn command-line arguments into jobs.

use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::Job;

/// OS metadata files that are never worth hashing when expanding a directory.
pub fn is_os_hidden_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    matches!(
        name,
        ".DS_Store" | ".AppleDouble" | ".LSOverride" | "Thumbs.db" | "ehthumbs.db" | "Desktop.ini"
    ) || name.starts_with("._")
}

/// One job per argument, in argument order.
///
/// With `recursive`, a directory argument is replaced by the regular files beneath it, sorted by
/// file name. Walk errors are logged and skipped. Without it a directory stays a single job and
/// fails at read time.
pub fn expand_inputs(paths: &[PathBuf], recursive: bool) -> Vec<Job> {
    let mut jobs = Vec::with_capacity(paths.len());
    for path in paths {
        if recursive && path.is_dir() {
            walk_files(path, &mut jobs);
        } else {
            jobs.push(Job::new(path.clone()));
        }
    }
    jobs
}

fn walk_files(dir: &Path, jobs: &mut Vec<Job>) {
    for entry in WalkDir::new(dir).sort_by_file_name() {
        match entry {
            Ok(e) if e.file_type().is_file() && !is_os_hidden_file(e.path()) => {
                jobs.push(Job::new(e.into_path()));
            }
            Ok(_) => {}
            Err(err) => warn!("Skipping {}: {}", err.path().unwrap_or(dir).display(), err),
        }
    }
}
