pub mod config;
pub mod fanhash_toml;
pub mod fd_limit;
pub mod logger;

pub use config::*;
pub use fanhash_toml::{FanhashToml, apply_file_to_opts, load_fanhash_toml};
pub use fd_limit::{FDS_PER_WORKER, max_open_fds, max_workers_by_fd_limit};
pub use logger::setup_logging;
