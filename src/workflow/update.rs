/// Self-update from GitHub releases.
///
/// Release data is fetched by a background `-check` run and cached as JSON
/// under `<cache>/_aw/update`; interactive runs only read that cache.
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::config::WorkflowConfig;

/// Name of the background job that checks for updates.
pub const UPDATE_JOB_NAME: &str = "checkForUpdate";

const GITHUB_API: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("alfred-emoji/", env!("CARGO_PKG_VERSION"));
const STATE_FILE: &str = "releases.json";

/// Errors from checking for or installing updates.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("invalid version '{value}'")]
    InvalidVersion { value: String },

    /// The `update_repository` value is not `owner/repo`.
    #[error("invalid repository '{value}', expected owner/repo")]
    InvalidRepository { value: String },

    #[error("no newer release available")]
    NoRelease,

    #[error("cannot encode or decode update state: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub url: String,
}

/// A published, non-prerelease version with at least one workflow file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub version: Version,
    pub tag: String,
    /// Workflow files only (`.alfredworkflow`, `.alfred5workflow`, ...).
    pub assets: Vec<Asset>,
}

impl Release {
    /// The workflow file to install: the one built for `alfred_major` if
    /// present, else the generic `.alfredworkflow`.
    #[must_use]
    pub fn workflow_asset(&self, alfred_major: Option<u64>) -> Option<&Asset> {
        if let Some(major) = alfred_major {
            let suffix = format!(".alfred{major}workflow");
            if let Some(asset) = self.assets.iter().find(|a| a.name.ends_with(&suffix)) {
                return Some(asset);
            }
        }
        self.assets
            .iter()
            .find(|a| a.name.ends_with(".alfredworkflow"))
    }
}

/// Cached result of the last check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateState {
    pub last_check: DateTime<Utc>,
    pub releases: Vec<Release>,
}

/// Where releases come from.
pub trait ReleaseSource {
    /// Fetch all installable releases.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError` on network or decoding failure.
    fn releases(&self) -> Result<Vec<Release>, UpdateError>;

    /// Download `url` to `dest`.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError` on network or filesystem failure.
    fn download(&self, url: &str, dest: &Path) -> Result<(), UpdateError>;
}

// --- GitHub ---

/// Releases of a GitHub repository.
#[derive(Debug, Clone)]
pub struct GitHub {
    repo: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
    #[serde(default)]
    prerelease: bool,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    assets: Vec<GitHubAsset>,
}

#[derive(Debug, Deserialize)]
struct GitHubAsset {
    name: String,
    browser_download_url: String,
}

impl GitHub {
    /// # Errors
    ///
    /// `UpdateError::InvalidRepository` unless `repo` is `owner/repo`.
    pub fn new(repo: &str) -> Result<Self, UpdateError> {
        let repo = repo.trim();
        let valid = !repo.contains(char::is_whitespace)
            && matches!(
                repo.split_once('/'),
                Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/')
            );
        if !valid {
            return Err(UpdateError::InvalidRepository {
                value: repo.to_owned(),
            });
        }
        Ok(Self {
            repo: repo.to_owned(),
            api_base: GITHUB_API.to_owned(),
        })
    }

    #[must_use]
    pub fn releases_url(&self) -> String {
        format!("{}/repos/{}/releases", self.api_base, self.repo)
    }
}

impl ReleaseSource for GitHub {
    fn releases(&self) -> Result<Vec<Release>, UpdateError> {
        let url = self.releases_url();
        debug!(%url, "fetching releases");
        let raw: Vec<GitHubRelease> = ureq::get(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .call()?
            .into_body()
            .read_json()?;
        Ok(convert_releases(raw))
    }

    fn download(&self, url: &str, dest: &Path) -> Result<(), UpdateError> {
        debug!(%url, dest = %dest.display(), "downloading");
        let response = ureq::get(url).header("User-Agent", USER_AGENT).call()?;
        let mut reader = response.into_body().into_reader();
        let partial = dest.with_extension("part");
        let mut file = File::create(&partial)?;
        io::copy(&mut reader, &mut file)?;
        fs::rename(&partial, dest)?;
        Ok(())
    }
}

/// Keep published releases with a semver tag and a workflow file.
fn convert_releases(raw: Vec<GitHubRelease>) -> Vec<Release> {
    raw.into_iter()
        .filter(|r| !r.draft && !r.prerelease)
        .filter_map(|r| {
            let Ok(version) = parse_version(&r.tag_name) else {
                debug!(tag = %r.tag_name, "skipping release with non-semver tag");
                return None;
            };
            let assets: Vec<Asset> = r
                .assets
                .into_iter()
                .filter(|a| is_workflow_asset(&a.name))
                .map(|a| Asset {
                    name: a.name,
                    url: a.browser_download_url,
                })
                .collect();
            if assets.is_empty() {
                return None;
            }
            Some(Release {
                version,
                tag: r.tag_name,
                assets,
            })
        })
        .collect()
}

fn is_workflow_asset(name: &str) -> bool {
    let Some(stem) = name.strip_suffix("workflow") else {
        return false;
    };
    let Some(idx) = stem.rfind(".alfred") else {
        return false;
    };
    stem[idx + ".alfred".len()..]
        .chars()
        .all(|c| c.is_ascii_digit())
}

/// Parse a tag or version string as semver.
///
/// A leading `v` is dropped, and `1` / `1.2` are padded to `1.0.0` / `1.2.0`.
///
/// # Errors
///
/// `UpdateError::InvalidVersion` if the text is not a version.
pub fn parse_version(text: &str) -> Result<Version, UpdateError> {
    let trimmed = text.trim();
    let bare = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    if let Ok(version) = Version::parse(bare) {
        return Ok(version);
    }

    let split = bare.find(['-', '+']).unwrap_or(bare.len());
    let (core, rest) = bare.split_at(split);
    let parts = core.split('.').count();
    if parts < 3
        && core
            .split('.')
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
    {
        let padded = format!("{core}{}{rest}", ".0".repeat(3 - parts));
        if let Ok(version) = Version::parse(&padded) {
            return Ok(version);
        }
    }

    Err(UpdateError::InvalidVersion {
        value: text.to_owned(),
    })
}

// --- Updater ---

/// Checks a release source for newer versions of this workflow.
#[derive(Debug)]
pub struct Updater<S = GitHub> {
    source: S,
    current: Version,
    alfred_major: Option<u64>,
    dir: PathBuf,
    interval: TimeDelta,
}

impl Updater<GitHub> {
    /// The updater for `update_repository`, or `None` when it is unset.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError` for a malformed repository or workflow version.
    pub fn from_config(cfg: &WorkflowConfig) -> Result<Option<Self>, UpdateError> {
        let Some(repo) = cfg.update_repository.as_deref() else {
            return Ok(None);
        };
        let source = GitHub::new(repo)?;
        Updater::new(source, &cfg.version, cfg.alfred_major, &cfg.cache_dir).map(Some)
    }
}

impl<S: ReleaseSource> Updater<S> {
    /// # Errors
    ///
    /// `UpdateError::InvalidVersion` if `current_version` is not a version.
    pub fn new(
        source: S,
        current_version: &str,
        alfred_major: Option<u64>,
        cache_dir: &Path,
    ) -> Result<Self, UpdateError> {
        Ok(Self {
            source,
            current: parse_version(current_version)?,
            alfred_major,
            dir: cache_dir.join("_aw").join("update"),
            interval: TimeDelta::hours(24),
        })
    }

    fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    /// The cached state, if a check has ever completed.
    #[must_use]
    pub fn state(&self) -> Option<UpdateState> {
        let text = fs::read_to_string(self.state_path()).ok()?;
        match serde_json::from_str(&text) {
            Ok(state) => Some(state),
            Err(e) => {
                debug!(error = %e, "ignoring unreadable update state");
                None
            }
        }
    }

    fn save_state(&self, state: &UpdateState) -> Result<(), UpdateError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.state_path();
        let partial = path.with_extension("part");
        fs::write(&partial, serde_json::to_vec_pretty(state)?)?;
        fs::rename(&partial, &path)?;
        Ok(())
    }

    /// Whether the last check is older than the interval (or never ran).
    #[must_use]
    pub fn check_due(&self) -> bool {
        self.check_due_at(Utc::now())
    }

    #[must_use]
    pub fn check_due_at(&self, now: DateTime<Utc>) -> bool {
        self.state()
            .is_none_or(|state| now - state.last_check >= self.interval)
    }

    /// Fetch releases and cache them. Returns whether a newer one exists.
    ///
    /// The check time is recorded even when fetching fails, so an offline
    /// or rate-limited source is retried after the interval, not on every
    /// query. Previously cached releases are kept in that case.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError` if fetching or saving fails.
    pub fn check_for_update(&self) -> Result<bool, UpdateError> {
        let releases = match self.source.releases() {
            Ok(releases) => releases,
            Err(e) => {
                let previous = self.state().map(|s| s.releases).unwrap_or_default();
                self.save_state(&UpdateState {
                    last_check: Utc::now(),
                    releases: previous,
                })?;
                return Err(e);
            }
        };
        let state = UpdateState {
            last_check: Utc::now(),
            releases,
        };
        self.save_state(&state)?;
        let newer = self.newest(&state).map(|r| r.version.to_string());
        info!(
            current = %self.current,
            releases = state.releases.len(),
            newer = newer.as_deref().unwrap_or("none"),
            "update check complete"
        );
        Ok(newer.is_some())
    }

    /// Whether the cached releases hold a newer installable version.
    #[must_use]
    pub fn update_available(&self) -> bool {
        self.state()
            .is_some_and(|state| self.newest(&state).is_some())
    }

    fn newest<'a>(&self, state: &'a UpdateState) -> Option<&'a Release> {
        state
            .releases
            .iter()
            .filter(|r| r.workflow_asset(self.alfred_major).is_some())
            .max_by(|a, b| a.version.cmp(&b.version))
            .filter(|r| r.version > self.current)
    }

    /// Download the newest release's workflow file into the cache.
    ///
    /// Returns the downloaded file; opening it hands it to Alfred.
    ///
    /// # Errors
    ///
    /// `UpdateError::NoRelease` if nothing newer is cached, otherwise any
    /// download error.
    pub fn install(&self) -> Result<PathBuf, UpdateError> {
        let state = self.state().ok_or(UpdateError::NoRelease)?;
        let release = self.newest(&state).ok_or(UpdateError::NoRelease)?;
        let asset = release
            .workflow_asset(self.alfred_major)
            .ok_or(UpdateError::NoRelease)?;

        fs::create_dir_all(&self.dir)?;
        let dest = self.dir.join(&asset.name);
        self.source.download(&asset.url, &dest)?;
        info!(version = %release.version, path = %dest.display(), "downloaded update");
        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSource(Vec<Release>);

    impl ReleaseSource for StaticSource {
        fn releases(&self) -> Result<Vec<Release>, UpdateError> {
            Ok(self.0.clone())
        }

        fn download(&self, url: &str, dest: &Path) -> Result<(), UpdateError> {
            fs::write(dest, url)?;
            Ok(())
        }
    }

    struct FailingSource;

    impl ReleaseSource for FailingSource {
        fn releases(&self) -> Result<Vec<Release>, UpdateError> {
            Err(UpdateError::Io(io::Error::other("offline")))
        }

        fn download(&self, _url: &str, _dest: &Path) -> Result<(), UpdateError> {
            Err(UpdateError::Io(io::Error::other("offline")))
        }
    }

    fn release(version: &str, assets: &[&str]) -> Release {
        Release {
            version: parse_version(version).unwrap(),
            tag: format!("v{version}"),
            assets: assets
                .iter()
                .map(|name| Asset {
                    name: (*name).to_owned(),
                    url: format!("https://example.com/{version}/{name}"),
                })
                .collect(),
        }
    }

    fn updater(
        tmp: &tempfile::TempDir,
        current: &str,
        releases: Vec<Release>,
    ) -> Updater<StaticSource> {
        Updater::new(StaticSource(releases), current, Some(5), tmp.path()).unwrap()
    }

    #[test]
    fn test_parse_version_forms() {
        assert_eq!(parse_version("v1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(parse_version("1.2").unwrap(), Version::new(1, 2, 0));
        assert_eq!(parse_version("V2").unwrap(), Version::new(2, 0, 0));
        assert_eq!(
            parse_version("1.2-beta").unwrap(),
            Version::parse("1.2.0-beta").unwrap()
        );
        assert!(parse_version("nightly").is_err());
        assert!(parse_version("").is_err());
    }

    #[test]
    fn test_workflow_asset_names() {
        assert!(is_workflow_asset("Emoji.alfredworkflow"));
        assert!(is_workflow_asset("Emoji.alfred5workflow"));
        assert!(!is_workflow_asset("Emoji.zip"));
        assert!(!is_workflow_asset("Emoji.alfredxworkflow"));
    }

    #[test]
    fn test_asset_prefers_alfred_version() {
        let r = release("1.0.0", &["E.alfredworkflow", "E.alfred5workflow"]);
        assert_eq!(r.workflow_asset(Some(5)).unwrap().name, "E.alfred5workflow");
        assert_eq!(r.workflow_asset(Some(4)).unwrap().name, "E.alfredworkflow");
        assert_eq!(r.workflow_asset(None).unwrap().name, "E.alfredworkflow");

        let only4 = release("1.0.0", &["E.alfred4workflow"]);
        assert!(only4.workflow_asset(Some(5)).is_none());
    }

    #[test]
    fn test_convert_github_releases() {
        let raw: Vec<GitHubRelease> = serde_json::from_str(
            r#"[
              {"tag_name": "v2.0.0-beta.1", "prerelease": true, "assets": [
                {"name": "E.alfredworkflow", "browser_download_url": "https://x/2b"}]},
              {"tag_name": "v1.3.0", "draft": true, "assets": [
                {"name": "E.alfredworkflow", "browser_download_url": "https://x/13"}]},
              {"tag_name": "v1.2.0", "assets": [
                {"name": "E.alfredworkflow", "browser_download_url": "https://x/12"},
                {"name": "checksums.txt", "browser_download_url": "https://x/sum"}]},
              {"tag_name": "nightly", "assets": [
                {"name": "E.alfredworkflow", "browser_download_url": "https://x/n"}]},
              {"tag_name": "v1.1.0", "assets": [
                {"name": "source.zip", "browser_download_url": "https://x/src"}]},
              {"tag_name": "1.0", "assets": [
                {"name": "E.alfredworkflow", "browser_download_url": "https://x/10"}]}
            ]"#,
        )
        .unwrap();
        let releases = convert_releases(raw);
        let versions: Vec<String> = releases.iter().map(|r| r.version.to_string()).collect();
        assert_eq!(versions, vec!["1.2.0", "1.0.0"]);
        assert_eq!(releases[0].assets.len(), 1);
        assert_eq!(releases[0].assets[0].url, "https://x/12");
    }

    #[test]
    fn test_github_repository_validation() {
        assert_eq!(
            GitHub::new("owner/repo").unwrap().releases_url(),
            "https://api.github.com/repos/owner/repo/releases"
        );
        for bad in ["", "owner", "/repo", "owner/", "a/b/c", "own er/repo"] {
            assert!(
                matches!(GitHub::new(bad), Err(UpdateError::InvalidRepository { .. })),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn test_from_config_disabled_without_repository() {
        let cfg = WorkflowConfig::resolve(&crate::cli::EnvArgs::default());
        assert!(Updater::from_config(&cfg).unwrap().is_none());
    }

    #[test]
    fn test_check_due_without_state() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(updater(&tmp, "1.0.0", vec![]).check_due());
    }

    #[test]
    fn test_check_not_due_after_check() {
        let tmp = tempfile::tempdir().unwrap();
        let up = updater(&tmp, "1.0.0", vec![]);
        up.check_for_update().unwrap();
        assert!(!up.check_due());
        assert!(up.check_due_at(Utc::now() + TimeDelta::hours(25)));
    }

    #[test]
    fn test_update_available_when_newer() {
        let tmp = tempfile::tempdir().unwrap();
        let up = updater(
            &tmp,
            "1.0.0",
            vec![
                release("1.0.0", &["E.alfredworkflow"]),
                release("1.1.0", &["E.alfredworkflow"]),
            ],
        );
        assert!(!up.update_available());
        assert!(up.check_for_update().unwrap());
        assert!(up.update_available());
    }

    #[test]
    fn test_no_update_when_current() {
        let tmp = tempfile::tempdir().unwrap();
        let up = updater(&tmp, "v1.1", vec![release("1.1.0", &["E.alfredworkflow"])]);
        assert!(!up.check_for_update().unwrap());
        assert!(!up.update_available());
    }

    #[test]
    fn test_failed_check_keeps_previous_state() {
        let tmp = tempfile::tempdir().unwrap();
        let good = updater(&tmp, "1.0.0", vec![release("2.0.0", &["E.alfredworkflow"])]);
        good.check_for_update().unwrap();

        let bad = Updater::new(FailingSource, "1.0.0", Some(5), tmp.path()).unwrap();
        assert!(bad.check_for_update().is_err());
        assert!(bad.update_available());
        assert!(!bad.check_due());
    }

    #[test]
    fn test_failed_first_check_is_throttled() {
        let tmp = tempfile::tempdir().unwrap();
        let up = Updater::new(FailingSource, "1.0.0", None, tmp.path()).unwrap();
        assert!(up.check_due());
        assert!(up.check_for_update().is_err());
        assert!(!up.check_due());
        assert!(up.check_due_at(Utc::now() + TimeDelta::hours(25)));
        assert!(!up.update_available());
    }

    #[test]
    fn test_install_downloads_newest() {
        let tmp = tempfile::tempdir().unwrap();
        let up = updater(
            &tmp,
            "1.0.0",
            vec![
                release("1.5.0", &["E.alfredworkflow"]),
                release("2.0.0", &["E.alfredworkflow", "E.alfred5workflow"]),
            ],
        );
        up.check_for_update().unwrap();
        let path = up.install().unwrap();
        assert!(path.ends_with("E.alfred5workflow"));
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "https://example.com/2.0.0/E.alfred5workflow"
        );
    }

    #[test]
    fn test_install_without_release() {
        let tmp = tempfile::tempdir().unwrap();
        let up = updater(&tmp, "1.0.0", vec![]);
        assert!(matches!(up.install(), Err(UpdateError::NoRelease)));
    }

    #[test]
    fn test_invalid_current_version() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            Updater::new(StaticSource(vec![]), "dev", None, tmp.path()),
            Err(UpdateError::InvalidVersion { .. })
        ));
    }
}
