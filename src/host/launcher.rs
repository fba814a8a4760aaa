//! Browser process launching.
//!
//! The launcher starts the browser that runs the agent, with a throwaway
//! profile directory and the agent URL on its command line. The returned
//! [`LaunchedBrowser`] kills the process and deletes the profile when dropped.

// ============================================================================
// Imports
// ============================================================================

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tempfile::TempDir;
use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Replaced by the agent WebSocket URL in launcher arguments.
pub const AGENT_URL_PLACEHOLDER: &str = "{agent_url}";

/// Replaced by the temporary profile path in launcher arguments.
pub const PROFILE_PLACEHOLDER: &str = "{profile}";

// ============================================================================
// ProcessGuard
// ============================================================================

/// Guards a child process and ensures it is killed when dropped.
pub(crate) struct ProcessGuard {
    /// The child process handle.
    child: Option<Child>,
    /// Process ID for logging.
    pid: u32,
}

impl ProcessGuard {
    /// Creates a new process guard.
    fn new(child: Child) -> Self {
        let pid = child.id().unwrap_or(0);
        debug!(pid, "Process guard created");
        Self {
            child: Some(child),
            pid,
        }
    }

    /// Kills the process and waits for it to exit.
    pub(crate) async fn kill(&mut self) {
        if let Some(mut child) = self.child.take() {
            debug!(pid = self.pid, "Killing browser process");
            if let Err(e) = child.kill().await {
                debug!(pid = self.pid, error = %e, "Failed to kill process");
            }
            if let Err(e) = child.wait().await {
                debug!(pid = self.pid, error = %e, "Failed to wait for process");
            }
            info!(pid = self.pid, "Browser process terminated");
        }
    }

    /// Returns the process ID.
    #[inline]
    pub(crate) fn pid(&self) -> u32 {
        self.pid
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take()
            && let Err(e) = child.start_kill()
        {
            debug!(pid = self.pid, error = %e, "Failed to send kill signal in Drop");
        }
    }
}

// ============================================================================
// LaunchedBrowser
// ============================================================================

/// A running browser process and its temporary profile.
pub(crate) struct LaunchedBrowser {
    /// Process handle, killed first on drop.
    pub(crate) process: ProcessGuard,
    /// Profile directory, removed on drop.
    _profile: TempDir,
}

// ============================================================================
// Launcher
// ============================================================================

/// Browser binary plus its argument template.
///
/// Every argument has `{agent_url}` and `{profile}` substituted. When no
/// argument mentions `{agent_url}`, the URL is appended as the last argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launcher {
    /// Path to the browser binary.
    binary: PathBuf,
    /// Argument template.
    args: Vec<String>,
}

impl Launcher {
    /// Creates a launcher for `binary` with the argument template `args`.
    #[inline]
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            binary: binary.into(),
            args,
        }
    }

    /// Returns the browser binary path.
    #[inline]
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Expands the argument template.
    #[must_use]
    pub fn expand_args(&self, agent_url: &str, profile: &Path) -> Vec<String> {
        let profile = profile.display().to_string();
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                arg.replace(AGENT_URL_PLACEHOLDER, agent_url)
                    .replace(PROFILE_PLACEHOLDER, &profile)
            })
            .collect();

        if !self.args.iter().any(|arg| arg.contains(AGENT_URL_PLACEHOLDER)) {
            args.push(agent_url.to_string());
        }
        args
    }

    /// Spawns the browser pointed at `agent_url`.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the profile directory cannot be created
    /// - [`Error::ProcessLaunchFailed`] if the process fails to spawn
    pub(crate) fn spawn(&self, agent_url: &str) -> Result<LaunchedBrowser> {
        let profile = tempfile::Builder::new()
            .prefix("ckb-light-client-")
            .tempdir()?;
        debug!(path = %profile.path().display(), "Created temporary profile");

        let mut cmd = Command::new(&self.binary);
        cmd.args(self.expand_args(agent_url, profile.path()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(Error::process_launch_failed)?;
        let process = ProcessGuard::new(child);
        info!(pid = process.pid(), binary = %self.binary.display(), "Browser process spawned");

        Ok(LaunchedBrowser {
            process,
            _profile: profile,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_args_substitutes_placeholders() {
        let launcher = Launcher::new(
            "/usr/bin/chromium",
            vec![
                "--user-data-dir={profile}".to_string(),
                "--agent={agent_url}".to_string(),
            ],
        );

        let args = launcher.expand_args("ws://127.0.0.1:9100", Path::new("/tmp/p"));
        assert_eq!(args, ["--user-data-dir=/tmp/p", "--agent=ws://127.0.0.1:9100"]);
    }

    #[test]
    fn test_expand_args_appends_url() {
        let launcher = Launcher::new("/usr/bin/chromium", vec!["--headless".to_string()]);
        let args = launcher.expand_args("ws://127.0.0.1:9100", Path::new("/tmp/p"));
        assert_eq!(args, ["--headless", "ws://127.0.0.1:9100"]);
    }

    #[tokio::test]
    async fn test_spawn_missing_binary_fails() {
        let launcher = Launcher::new("/nonexistent/browser", Vec::new());
        let err = launcher.spawn("ws://127.0.0.1:1").err().expect("spawn fails");
        assert!(matches!(err, Error::ProcessLaunchFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_spawn_and_kill() {
        let launcher = Launcher::new("/bin/sh", vec!["-c".to_string(), "sleep 30".to_string()]);
        let mut browser = launcher.spawn("ws://127.0.0.1:1").expect("spawn");
        assert!(browser.process.pid() > 0);
        browser.process.kill().await;
    }
}
