/// Check mode (`-check`): refresh the cached release list.
///
/// Normally run as a detached background job started by query mode.
use tracing::{info, warn};

use crate::workflow::{JobRegistry, UPDATE_JOB_NAME, Updater, WorkflowConfig, WorkflowError};

/// Run `alfred-emoji -check`.
///
/// A no-op when `update_repository` is unset.
///
/// # Errors
///
/// `WorkflowError::Update` if the repository is malformed or the release
/// source cannot be queried.
pub fn run(cfg: &WorkflowConfig) -> Result<(), WorkflowError> {
    let Some(updater) = Updater::from_config(cfg)? else {
        info!("update_repository not set, skipping update check");
        return Ok(());
    };

    info!("Checking for updates...");
    let result = updater.check_for_update();

    let jobs = JobRegistry::new(&cfg.cache_dir);
    if let Err(e) = jobs.release(UPDATE_JOB_NAME) {
        warn!(error = %e, "could not release update job");
    }

    if result? {
        info!("update available");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::EnvArgs;
    use crate::workflow::UpdateError;

    #[test]
    fn test_no_repository_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let env = EnvArgs {
            cache_dir: Some(tmp.path().to_path_buf()),
            ..EnvArgs::default()
        };
        run(&WorkflowConfig::resolve(&env)).unwrap();
        assert!(!tmp.path().join("_aw").exists());
    }

    #[test]
    fn test_bad_repository_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let env = EnvArgs {
            cache_dir: Some(tmp.path().to_path_buf()),
            update_repository: Some("not-a-repo".to_owned()),
            ..EnvArgs::default()
        };
        let err = run(&WorkflowConfig::resolve(&env)).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Update(UpdateError::InvalidRepository { .. })
        ));
        assert_eq!(err.exit_code(), 1);
    }
}
