//! Engine: hashing, inputs, output and the CLI surface around the pipeline.

pub mod arg_parser;
pub mod handlers;
pub mod hashing;
pub mod inputs;
pub mod output;
pub mod progress;

// Re-export commonly used items
pub use arg_parser::Cli;
pub use handlers::handle_run;
pub use hashing::{Blake3Digester, ByteSource, Digester, FileBytes, FsSource, hash_file};
pub use inputs::{expand_inputs, is_os_hidden_file};
pub use output::{OutputFormat, format_result, write_result};
