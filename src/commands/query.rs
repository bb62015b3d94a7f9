/// Query mode: search emojis and emit Script Filter feedback.
use std::io;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info, warn};

use crate::cli::{OutputCtx, write_feedback};
use crate::emoji::{EmojiIndex, EmojiMatch, SearchIndex, SkinTone};
use crate::types::{Feedback, Icon, Item, Modifier};
use crate::workflow::config::UPDATE_AVAILABLE_ICON;
use crate::workflow::magic::{self, MagicQuery};
use crate::workflow::update::ReleaseSource;
use crate::workflow::{JobRegistry, UPDATE_JOB_NAME, Updater, WorkflowConfig, WorkflowError};

/// Workflow variable telling the next step what to do with `arg`.
pub const ACTION_VAR: &str = "action";

/// Run a search for `query` and write the feedback.
///
/// # Errors
///
/// `WorkflowError::Emoji` if `skin_tone` is invalid (nothing is written), or
/// an error from a magic action.
pub fn run(query: &str, cfg: &WorkflowConfig, ctx: &OutputCtx) -> Result<(), WorkflowError> {
    let updater = Updater::from_config(cfg).unwrap_or_else(|e| {
        warn!(error = %e, "updates disabled");
        None
    });

    if let Some(magic) = magic::parse(query) {
        let feedback = match magic {
            MagicQuery::Run(action) => magic::run(action, cfg, updater.as_ref())?,
            MagicQuery::List(actions) => magic::list_feedback(&actions),
        };
        write_feedback(&feedback, ctx);
        return Ok(());
    }

    if let Some(updater) = &updater {
        let jobs = JobRegistry::new(&cfg.cache_dir);
        match check_command() {
            Ok(cmd) => {
                trigger_update_check(updater, &jobs, cmd);
            }
            Err(e) => warn!(error = %e, "cannot locate own executable for update check"),
        }
    }

    let tone: SkinTone = cfg.skin_tone.parse()?;
    let index = EmojiIndex::default();
    let mut feedback = build_feedback(query, tone, &index, &cfg.image_dir);
    let update_available = updater.as_ref().is_some_and(Updater::update_available);
    advertise_update(&mut feedback, query, update_available);

    write_feedback(&feedback, ctx);
    Ok(())
}

/// Start a background update check if one is due and none is running.
///
/// Returns whether a job was started. Failures are logged, never returned.
pub fn trigger_update_check<S: ReleaseSource>(
    updater: &Updater<S>,
    jobs: &JobRegistry,
    cmd: Command,
) -> bool {
    if !updater.check_due() || jobs.is_running(UPDATE_JOB_NAME) {
        return false;
    }
    info!("Running update check in background...");
    match jobs.run_in_background(UPDATE_JOB_NAME, cmd) {
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "Error starting update check");
            false
        }
    }
}

fn check_command() -> io::Result<Command> {
    let mut cmd = Command::new(std::env::current_exe()?);
    cmd.arg("-check");
    Ok(cmd)
}

/// Turn search results into feedback: one item per match, in order, or a
/// single placeholder when there are none.
#[must_use]
pub fn build_feedback(
    query: &str,
    tone: SkinTone,
    index: &impl SearchIndex,
    image_dir: &Path,
) -> Feedback {
    let matches = index.search(query, tone);
    debug!(query, %tone, matches = matches.len(), "search complete");

    let mut feedback = Feedback::new();
    for m in &matches {
        feedback.push(match_item(m, image_dir));
    }
    feedback.warn_empty("No matching items", "Try a different query?");
    feedback
}

fn match_item(m: &EmojiMatch, image_dir: &Path) -> Item {
    let icon = image_dir.join(format!("{}.png", m.image_id));
    let c = &m.character;
    Item::new(&m.shortcode)
        .subtitle(format!("Paste symbol \"{c}\" in frontmost app"))
        .arg(c)
        .uid(&m.shortcode)
        .valid(true)
        .icon(Icon::image(icon.to_string_lossy()))
        .var(ACTION_VAR, "paste")
        .cmd(
            Modifier::new()
                .arg(c)
                .subtitle(format!("Copy symbol \"{c}\" to the clipboard"))
                .var(ACTION_VAR, "copy"),
        )
        .alt(
            Modifier::new()
                .arg(c)
                .subtitle(format!("Copy code \":{}:\" to the clipboard", m.shortcode))
                .var(ACTION_VAR, "copy"),
        )
}

/// On an empty query with an update available, put the update item first
/// and strip UIDs so Alfred keeps it there.
pub fn advertise_update(feedback: &mut Feedback, query: &str, update_available: bool) {
    if query.trim().is_empty() && update_available {
        feedback.items.insert(0, update_item());
        feedback.suppress_uids();
    }
}

/// Non-actionable item whose autocomplete triggers the `update` magic action.
fn update_item() -> Item {
    Item::new("Update available!")
        .subtitle("↩ to install")
        .autocomplete(format!("{}update", magic::MAGIC_PREFIX))
        .valid(false)
        .icon(Icon::image(UPDATE_AVAILABLE_ICON))
}
