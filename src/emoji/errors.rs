/// Errors from the emoji domain layer.
use thiserror::Error;

/// Errors that can occur while resolving emoji input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmojiError {
    /// The `skin_tone` value is not one of the recognised labels.
    #[error("invalid skin_tone \"{value}\"")]
    InvalidModifier {
        /// The rejected value, verbatim.
        value: String,
    },
}
