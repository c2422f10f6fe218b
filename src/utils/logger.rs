use colored::Colorize;
use env_logger::{Builder, Target};
use log::{Level, LevelFilter};
use std::io::Write;

/// Label shown in the line prefix. Only warnings and errors carry one.
pub fn level_label(level: Level) -> Option<&'static str> {
    match level {
        Level::Error => Some("ERROR"),
        Level::Warn => Some("WARN"),
        _ => None,
    }
}

/// Install the stderr logger. Stdout is reserved for result lines.
/// Dependencies log at Warn; this crate at Info, or Debug when `verbose`. `RUST_LOG` is applied first.
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .target(Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME").cyan();
            match level_label(record.level()) {
                Some(label) => {
                    let label = match record.level() {
                        Level::Error => label.red(),
                        _ => label.yellow(),
                    };
                    writeln!(
                        buf,
                        "[{} {} {}] {}",
                        name,
                        label,
                        record.target().white(),
                        record.args()
                    )
                }
                None => writeln!(buf, "[{}] {}", name, record.args()),
            }
        })
        .try_init();
}
