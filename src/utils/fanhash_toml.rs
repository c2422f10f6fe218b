//! Load `.fanhash.toml` from a directory (CLI only). Lib callers pass [`HashOpts`](crate::HashOpts) instead.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::Opts;
use crate::engine::output::OutputFormat;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct FanhashToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsSection {
    workers: Option<usize>,
    queue_cap: Option<usize>,
    timeout_secs: Option<u64>,
    format: Option<OutputFormat>,
    recursive: Option<bool>,
    strict: Option<bool>,
    verbose: Option<bool>,
}

impl FanhashToml {
    pub fn parse(s: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

/// Load the settings file from `dir`. `Ok(None)` when there is no file.
pub fn load_fanhash_toml(dir: &Path) -> Result<Option<FanhashToml>> {
    let path = dir.join(PackagePaths::get().config_filename());
    if !path.is_file() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let file = FanhashToml::parse(&s).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(file))
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $field:ident => $opts_field:ident) => {
        if let Some(v) = $section.$field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
pub fn apply_file_to_opts(file: &FanhashToml, opts: &mut Opts) {
    let s = &file.settings;
    if let Some(n) = s.workers {
        opts.num_workers = Some(n);
    }
    if let Some(cap) = s.queue_cap {
        opts.queue_cap = Some(cap);
    }
    if let Some(secs) = s.timeout_secs {
        opts.timeout = Some(Duration::from_secs(secs));
    }
    apply_file_opt!(s, opts, format => format);
    apply_file_opt!(s, opts, recursive => recursive);
    apply_file_opt!(s, opts, strict => strict);
    apply_file_opt!(s, opts, verbose => verbose);
}
