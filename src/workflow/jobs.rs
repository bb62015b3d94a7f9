/// Named background jobs tracked by pid files.
///
/// A job's pid file doubles as its lock: it is created with `create_new`
/// before the child is spawned, so two invocations racing to start the same
/// job cannot both succeed.
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum JobError {
    /// A live process already holds the job.
    #[error("job '{name}' is already running")]
    AlreadyRunning { name: String },

    #[error("job '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Registry of background jobs under `<cache>/_aw/jobs`.
#[derive(Debug, Clone)]
pub struct JobRegistry {
    dir: PathBuf,
}

impl JobRegistry {
    #[must_use]
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            dir: cache_dir.join("_aw").join("jobs"),
        }
    }

    fn pid_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.pid"))
    }

    fn read_pid(&self, name: &str) -> Option<u32> {
        fs::read_to_string(self.pid_path(name))
            .ok()?
            .trim()
            .parse()
            .ok()
    }

    /// Whether a live process holds `name`. Stale pid files are removed.
    #[must_use]
    pub fn is_running(&self, name: &str) -> bool {
        let path = self.pid_path(name);
        if !path.exists() {
            return false;
        }
        match self.read_pid(name) {
            Some(pid) if process_alive(pid) => true,
            // Lock taken, pid not written yet.
            None if is_fresh(&path) => true,
            pid => {
                debug!(job = name, ?pid, "removing stale pid file");
                let _ = fs::remove_file(&path);
                false
            }
        }
    }

    /// Spawn `cmd` detached from this process and record it as `name`.
    ///
    /// The child gets null stdio and its own process group; it is never
    /// waited on.
    ///
    /// # Errors
    ///
    /// `JobError::AlreadyRunning` if a live process holds the job, or
    /// `JobError::Io` if the pid file cannot be written or the spawn fails.
    #[allow(clippy::zombie_processes)]
    pub fn run_in_background(&self, name: &str, mut cmd: Command) -> Result<u32, JobError> {
        if self.is_running(name) {
            return Err(JobError::AlreadyRunning {
                name: name.to_owned(),
            });
        }

        let io_err = |source: io::Error| JobError::Io {
            name: name.to_owned(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;

        let path = self.pid_path(name);
        let mut lock = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(JobError::AlreadyRunning {
                    name: name.to_owned(),
                });
            }
            Err(e) => return Err(io_err(e)),
        };

        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                drop(lock);
                let _ = fs::remove_file(&path);
                return Err(io_err(e));
            }
        };
        let pid = child.id();
        write!(lock, "{pid}").map_err(io_err)?;

        info!(job = name, pid, "started background job");
        Ok(pid)
    }

    /// Drop the job's pid file if it names the current process.
    ///
    /// # Errors
    ///
    /// `JobError::Io` if the pid file exists but cannot be removed.
    pub fn release(&self, name: &str) -> Result<(), JobError> {
        if self.read_pid(name) != Some(std::process::id()) {
            return Ok(());
        }
        match fs::remove_file(self.pid_path(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(JobError::Io {
                name: name.to_owned(),
                source,
            }),
        }
    }
}

/// Grace period for a pid file that is still empty.
const LOCK_GRACE: Duration = Duration::from_secs(10);

fn is_fresh(path: &Path) -> bool {
    let Ok(meta) = fs::metadata(path) else {
        return false;
    };
    meta.len() == 0
        && meta
            .modified()
            .ok()
            .and_then(|t| t.elapsed().ok())
            .is_some_and(|age| age < LOCK_GRACE)
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    if pid <= 0 {
        return false;
    }
    // SAFETY: signal 0 only checks that the process exists; nothing is sent.
    let rc = unsafe { libc::kill(pid, 0) };
    rc == 0 || io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}
