/// Alfred workflow plumbing: configuration, background jobs, self-update,
/// magic actions.
pub mod config;
pub mod errors;
pub mod jobs;
pub mod magic;
pub mod update;

use std::io;
use std::path::Path;
use std::process::Command;

pub use config::WorkflowConfig;
pub use errors::WorkflowError;
pub use jobs::{JobError, JobRegistry};
pub use update::{UPDATE_JOB_NAME, UpdateError, Updater};

/// Hand `path` to the system opener (`open` on macOS, `xdg-open` elsewhere).
///
/// # Errors
///
/// Returns an error if the opener cannot be run or exits unsuccessfully.
pub fn open_path(path: &Path) -> io::Result<()> {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    let status = Command::new(opener).arg(path).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!(
            "{opener} {} exited with {status}",
            path.display()
        )))
    }
}
