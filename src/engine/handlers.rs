//! CLI command handler: hash the given files and print results as they arrive.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::arg_parser::Cli;
use crate::engine::hashing::{Blake3Digester, FsSource};
use crate::engine::inputs::expand_inputs;
use crate::engine::output::write_result;
use crate::engine::progress::setup_progress;
use crate::pipeline::{CancelToken, hash_jobs};
use crate::utils::{apply_file_to_opts, load_fanhash_toml, setup_logging};
use crate::{Completion, Opts};

/// Defaults, then `.fanhash.toml` in `config_dir`, then CLI flags. Installs the logger.
fn setup_opts(cli: &Cli, config_dir: &Path) -> Opts {
    let mut opts = Opts::default();
    let file = load_fanhash_toml(config_dir);
    if let Ok(Some(f)) = &file {
        apply_file_to_opts(f, &mut opts);
    }

    if let Some(n) = cli.workers {
        opts.num_workers = Some(n);
    }
    if let Some(cap) = cli.queue_cap {
        opts.queue_cap = Some(cap);
    }
    if let Some(secs) = cli.timeout {
        opts.timeout = Some(Duration::from_secs(secs));
    }
    if let Some(format) = cli.format {
        opts.format = format;
    }
    opts.recursive = cli.recursive.unwrap_or(opts.recursive);
    opts.strict = cli.strict.unwrap_or(opts.strict);
    opts.verbose = cli.verbose.unwrap_or(opts.verbose);

    setup_logging(opts.verbose);
    if let Err(e) = file {
        warn!("{:#}; ignoring settings file", e);
    }
    opts
}

/// Hash every file on the command line. Errors for setup failures, cancellation, timeout,
/// and (with --strict) any per-file failure.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("read current directory")?;
    let opts = setup_opts(cli, &cwd);
    debug!("{} CONFIG: {:#?}", env!("CARGO_PKG_NAME").to_uppercase(), opts);

    let jobs = expand_inputs(&cli.files, opts.recursive);
    let cancel = CancelToken::new();
    cancel.cancel_on_ctrlc()?;

    let mut progress = setup_progress(opts.verbose, jobs.len());
    let mut out = io::stdout().lock();
    let summary = hash_jobs(
        jobs,
        Arc::new(FsSource),
        Arc::new(Blake3Digester),
        &opts,
        cancel,
        |result| {
            write_result(&mut out, result, opts.format).context("write result")?;
            if let Some(p) = progress.as_mut() {
                p.advance();
            }
            Ok(())
        },
    )?;
    out.flush().context("flush stdout")?;
    if let Some(p) = progress {
        p.finish();
    }

    info!(
        "hashed {}, failed {} of {}",
        summary.hashed, summary.failed, summary.expected
    );
    match summary.completion {
        Completion::Done => {}
        Completion::Cancelled { remaining } => {
            anyhow::bail!("cancelled by user; {} results not produced", remaining)
        }
        Completion::TimedOut { remaining } => {
            anyhow::bail!("timed out; {} results not produced", remaining)
        }
    }
    if opts.strict && summary.failed > 0 {
        anyhow::bail!("strict mode: {} file(s) could not be read", summary.failed);
    }
    Ok(())
}
