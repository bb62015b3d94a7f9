/// Top-level workflow errors.
use thiserror::Error;

use super::jobs::JobError;
use super::update::UpdateError;
use crate::emoji::EmojiError;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Bad user input (currently only the `skin_tone` variable).
    #[error(transparent)]
    Emoji(#[from] EmojiError),

    /// Checking for, or installing, an update failed.
    #[error("Update failed: {0}")]
    Update(#[from] UpdateError),

    /// A background job could not be managed.
    #[error("Background job error: {0}")]
    Job(#[from] JobError),

    /// An update action was requested without `update_repository` set.
    #[error("Updates are not configured (set the update_repository variable)")]
    UpdatesDisabled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Exit code mapping for `WorkflowError` variants.
impl WorkflowError {
    /// Return the process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Emoji(_) => 2,
            Self::Update(_) | Self::Job(_) | Self::UpdatesDisabled | Self::Io(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_skin_tone_message_and_code() {
        let err = WorkflowError::from(EmojiError::InvalidModifier {
            value: "blue".to_owned(),
        });
        assert_eq!(err.to_string(), "invalid skin_tone \"blue\"");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_update_error_code() {
        let err = WorkflowError::from(UpdateError::NoRelease);
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().starts_with("Update failed"));
    }
}
