/// Resolved workflow configuration.
///
/// Built once in `main` from the parsed environment and passed explicitly to
/// every command; nothing reads the environment after this point.
use std::path::PathBuf;

use crate::cli::EnvArgs;

/// Bundle ID used when not running under Alfred.
pub const DEFAULT_BUNDLE_ID: &str = "io.github.alfred-emoji";

/// Directory of PNG images, relative to the workflow directory.
pub const IMAGE_DIRECTORY: &str = "images";

/// Icon shown on the "update available" item.
pub const UPDATE_AVAILABLE_ICON: &str = "update-available.png";

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub bundle_id: String,
    /// This workflow's version, compared against release tags.
    pub version: String,
    /// Major version of the running Alfred app, if known.
    pub alfred_major: Option<u64>,
    pub cache_dir: PathBuf,
    pub data_dir: PathBuf,
    pub image_dir: PathBuf,
    /// Raw `skin_tone` value; validated when a query runs.
    pub skin_tone: String,
    /// GitHub `owner/repo`; `None` disables updates.
    pub update_repository: Option<String>,
    pub debug: bool,
}

impl WorkflowConfig {
    /// Resolve from the environment arguments, filling in defaults for
    /// anything Alfred did not provide.
    #[must_use]
    pub fn resolve(env: &EnvArgs) -> Self {
        let bundle_id = non_empty(env.bundle_id.as_deref())
            .unwrap_or(DEFAULT_BUNDLE_ID)
            .to_owned();
        let version = non_empty(env.workflow_version.as_deref())
            .unwrap_or(env!("CARGO_PKG_VERSION"))
            .to_owned();
        let cache_dir = env
            .cache_dir
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| fallback_dir(dirs::cache_dir(), &bundle_id));
        let data_dir = env
            .data_dir
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| fallback_dir(dirs::data_dir(), &bundle_id));

        Self {
            alfred_major: env.alfred_version.as_deref().and_then(major_version),
            version,
            cache_dir,
            data_dir,
            image_dir: PathBuf::from(IMAGE_DIRECTORY),
            skin_tone: env.skin_tone.clone().unwrap_or_default(),
            update_repository: non_empty(env.update_repository.as_deref()).map(str::to_owned),
            debug: env.alfred_debug,
            bundle_id,
        }
    }

    /// File name of the workflow log inside the cache directory.
    #[must_use]
    pub fn log_file_name(&self) -> String {
        format!("{}.log", self.bundle_id)
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.cache_dir.join(self.log_file_name())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn fallback_dir(base: Option<PathBuf>, bundle_id: &str) -> PathBuf {
    base.unwrap_or_else(std::env::temp_dir).join(bundle_id)
}

fn major_version(version: &str) -> Option<u64> {
    version.split('.').next()?.trim().parse().ok()
}
