//! Logging setup.
//!
//! Two outputs:
//! - **stderr**, which Alfred shows in its workflow debugger
//! - **`<cache>/<bundleid>.log`**, so detached `-check` runs leave a trace
//!
//! Level comes from `RUST_LOG`, defaulting to `info` (`debug` while Alfred's
//! debugger is open).

use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::workflow::WorkflowConfig;

/// Install the global subscriber.
///
/// Returns the file writer's guard, which must be kept alive (and dropped
/// before `process::exit`) so buffered lines reach the log file.
#[must_use]
pub fn init(config: &WorkflowConfig) -> Option<WorkerGuard> {
    let default_level = if config.debug { "debug" } else { "info" };
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_filter(filter());

    let (file_layer, guard) = match open_log_file(config) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("[alfred-emoji] log file disabled: {e}");
            (None, None)
        }
    };

    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
    guard
}

fn open_log_file(config: &WorkflowConfig) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    fs::create_dir_all(&config.cache_dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(config.log_file_name())
        .build(&config.cache_dir)?;
    Ok(appender)
}
