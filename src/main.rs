#![deny(clippy::all, clippy::pedantic)]
//! alfred-emoji — Alfred Script Filter entry point.

use clap::Parser;

use alfred_emoji::cli::{Cli, OutputCtx, normalize_args, write_error};
use alfred_emoji::workflow::WorkflowConfig;
use alfred_emoji::{commands, logging};

fn main() {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    let config = WorkflowConfig::resolve(&cli.env);
    let guard = logging::init(&config);

    // Check mode reports errors as plain text for Alfred's notification.
    let ctx = OutputCtx::new(cli.output, cli.no_header, cli.check);

    if let Err(err) = commands::dispatch(&cli, &config, &ctx) {
        tracing::error!(error = %err, "workflow failed");
        write_error(&err, &ctx);
        drop(guard);
        std::process::exit(err.exit_code());
    }
}
