//! Result line formatting. Only the aggregator writes these.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io::{self, Write};

use crate::JobResult;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `<path>: <digest-hex>` or `<path>: <error>`
    #[default]
    Text,
    /// One JSON object per line with `path` and either `digest` or `error`.
    Json,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

/// Write one result as a single newline-terminated line.
pub fn write_result<W, D>(out: &mut W, result: &JobResult<D>, format: OutputFormat) -> io::Result<()>
where
    W: Write + ?Sized,
    D: Display,
{
    match format {
        OutputFormat::Text => match &result.outcome {
            Ok(digest) => writeln!(out, "{}: {}", result.job, digest),
            Err(e) => writeln!(out, "{}: {}", result.job, e),
        },
        OutputFormat::Json => {
            let line = JsonLine {
                path: result.job.to_string(),
                digest: result.outcome.as_ref().ok().map(ToString::to_string),
                error: result.outcome.as_ref().err().map(|e| e.message.as_str()),
            };
            serde_json::to_writer(&mut *out, &line)?;
            writeln!(out)
        }
    }
}

/// Format one result as a line without the trailing newline.
pub fn format_result<D: Display>(result: &JobResult<D>, format: OutputFormat) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_result(&mut buf, result, format);
    let mut s = String::from_utf8_lossy(&buf).into_owned();
    s.truncate(s.trim_end_matches('\n').len());
    s
}
