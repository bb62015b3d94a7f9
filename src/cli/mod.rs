/// CLI layer: argument parsing and output formatting.
pub mod args;
pub mod output;

pub use args::{Cli, EnvArgs, OutputFormat, normalize_args};
pub use output::{OutputCtx, write_error, write_feedback};
