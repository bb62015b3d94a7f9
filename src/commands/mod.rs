/// Command dispatch: routes the run mode to its implementation.
pub mod check;
pub mod query;

use crate::cli::{Cli, OutputCtx};
use crate::workflow::{WorkflowConfig, WorkflowError};

/// What a single process run does, fixed at startup by the `-check` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Search and print feedback.
    Query,
    /// Refresh the cached release list; no feedback.
    Check,
}

impl Mode {
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.check { Self::Check } else { Self::Query }
    }
}

/// Dispatch a parsed command line to its handler.
///
/// # Errors
///
/// Returns `WorkflowError` on any command failure.
pub fn dispatch(cli: &Cli, cfg: &WorkflowConfig, ctx: &OutputCtx) -> Result<(), WorkflowError> {
    match Mode::from_cli(cli) {
        Mode::Check => check::run(cfg),
        Mode::Query => query::run(cli.query.as_deref().unwrap_or_default(), cfg, ctx),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_mode_from_flag() {
        let cli = Cli::try_parse_from(["alfred-emoji", "--check"]).unwrap();
        assert_eq!(Mode::from_cli(&cli), Mode::Check);
        let cli = Cli::try_parse_from(["alfred-emoji", "check"]).unwrap();
        assert_eq!(Mode::from_cli(&cli), Mode::Query);
    }
}
