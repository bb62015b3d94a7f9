/// Magic actions: `workflow:`-prefixed queries that run host-level commands
/// instead of searching.
use std::fs;
use std::io;
use std::path::Path;

use tracing::info;

use super::config::WorkflowConfig;
use super::errors::WorkflowError;
use super::open_path;
use super::update::Updater;
use crate::types::{Feedback, Item};

/// Query prefix that selects magic actions.
pub const MAGIC_PREFIX: &str = "workflow:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicAction {
    /// Download and install the newest release.
    Update,
    DelCache,
    DelData,
    OpenCache,
    OpenData,
    OpenLog,
}

impl MagicAction {
    pub const ALL: [Self; 6] = [
        Self::Update,
        Self::DelCache,
        Self::DelData,
        Self::OpenCache,
        Self::OpenData,
        Self::OpenLog,
    ];

    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::DelCache => "delcache",
            Self::DelData => "deldata",
            Self::OpenCache => "opencache",
            Self::OpenData => "opendata",
            Self::OpenLog => "log",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Update => "Install the latest version of this workflow",
            Self::DelCache => "Delete the workflow's cached data",
            Self::DelData => "Delete the workflow's saved data",
            Self::OpenCache => "Open the workflow's cache directory",
            Self::OpenData => "Open the workflow's data directory",
            Self::OpenLog => "Open the workflow's log file",
        }
    }
}

/// What a `workflow:` query asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MagicQuery {
    /// The query names an action exactly.
    Run(MagicAction),
    /// The query is a partial keyword; these actions match it.
    List(Vec<MagicAction>),
}

/// Interpret `query` as a magic action, or `None` for an ordinary query.
#[must_use]
pub fn parse(query: &str) -> Option<MagicQuery> {
    let rest = query.trim().strip_prefix(MAGIC_PREFIX)?.trim();
    if let Some(action) = MagicAction::ALL.into_iter().find(|a| a.keyword() == rest) {
        return Some(MagicQuery::Run(action));
    }
    Some(MagicQuery::List(
        MagicAction::ALL
            .into_iter()
            .filter(|a| a.keyword().starts_with(rest))
            .collect(),
    ))
}

/// Items that autocomplete to each action.
#[must_use]
pub fn list_feedback(actions: &[MagicAction]) -> Feedback {
    let mut feedback = Feedback::new();
    for action in actions {
        feedback.push(
            Item::new(action.description())
                .subtitle(format!("{MAGIC_PREFIX}{}", action.keyword()))
                .autocomplete(format!("{MAGIC_PREFIX}{}", action.keyword()))
                .valid(false),
        );
    }
    feedback.warn_empty("No matching magic actions", "Try workflow:");
    feedback
}

/// Run `action` and describe the outcome as a single informational item.
///
/// # Errors
///
/// `WorkflowError::UpdatesDisabled` for `update` without an updater, or the
/// underlying I/O or update error.
pub fn run(
    action: MagicAction,
    cfg: &WorkflowConfig,
    updater: Option<&Updater>,
) -> Result<Feedback, WorkflowError> {
    info!(action = action.keyword(), "running magic action");
    let title = match action {
        MagicAction::Update => {
            let updater = updater.ok_or(WorkflowError::UpdatesDisabled)?;
            let file = updater.install()?;
            open_path(&file)?;
            "Installing update…"
        }
        MagicAction::DelCache => {
            clear_dir(&cfg.cache_dir)?;
            "Deleted workflow cache"
        }
        MagicAction::DelData => {
            clear_dir(&cfg.data_dir)?;
            "Deleted workflow data"
        }
        MagicAction::OpenCache => {
            fs::create_dir_all(&cfg.cache_dir)?;
            open_path(&cfg.cache_dir)?;
            "Opening cache directory"
        }
        MagicAction::OpenData => {
            fs::create_dir_all(&cfg.data_dir)?;
            open_path(&cfg.data_dir)?;
            "Opening data directory"
        }
        MagicAction::OpenLog => {
            open_path(&cfg.log_file())?;
            "Opening log file"
        }
    };

    let mut feedback = Feedback::new();
    feedback.push(Item::new(title).valid(false));
    Ok(feedback)
}

/// Empty `dir`, leaving the directory itself in place.
fn clear_dir(dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    fs::create_dir_all(dir)
}
