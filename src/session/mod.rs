//! Light client session lifecycle.
//!
//! Exactly one page hosts the light client at any time. The
//! [`SessionManager`] owns it, gates remote calls on it, and swaps it out on
//! `new_client` / `new_dev_client`.
//!
//! # States
//!
//! | State | Meaning |
//! |-------|---------|
//! | `Uninitialized` | No page yet |
//! | `Initializing` | Page opened, waiting for the client to settle |
//! | `Ready` | Calls are forwarded |
//! | `Replacing` | Old page closed, new one coming up; calls wait |
//! | `Stopped` | `client.stop()` was forwarded; calls still reach the page |
//! | `Failed` | Initialization or replacement failed; only a replace recovers |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

// ============================================================================
// Submodules
// ============================================================================

/// Session manager.
pub mod manager;

// ============================================================================
// Re-exports
// ============================================================================

pub use manager::SessionManager;

// ============================================================================
// Constants
// ============================================================================

/// Default page the light client is served from.
pub const DEFAULT_CLIENT_URL: &str = "http://localhost:8000";

/// Control that starts the client on the public network.
pub const DEFAULT_STANDARD_CONTROL: &str = "Initialize workers";

/// Control that starts the client on a development chain.
pub const DEFAULT_DEV_CONTROL: &str = "Initialize dev workers";

/// Wait after clicking an initialization control.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1000);

// ============================================================================
// SessionState
// ============================================================================

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No page yet.
    Uninitialized,
    /// Page opened, client starting.
    Initializing,
    /// Accepting calls.
    Ready,
    /// Swapping the page.
    Replacing,
    /// Client stopped on request.
    Stopped,
    /// Last initialization or replacement failed.
    Failed,
}

impl SessionState {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Replacing => "replacing",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SessionConfig
// ============================================================================

/// Where the client lives and how it is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Page serving the light client.
    pub client_url: String,
    /// Control for [`NetworkMode::Standard`](crate::host::NetworkMode::Standard).
    pub standard_control: String,
    /// Control for [`NetworkMode::Development`](crate::host::NetworkMode::Development).
    pub dev_control: String,
    /// Wait after clicking a control.
    pub settle_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            client_url: DEFAULT_CLIENT_URL.to_string(),
            standard_control: DEFAULT_STANDARD_CONTROL.to_string(),
            dev_control: DEFAULT_DEV_CONTROL.to_string(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.client_url, "http://localhost:8000");
        assert_eq!(config.standard_control, "Initialize workers");
        assert_eq!(config.dev_control, "Initialize dev workers");
        assert_eq!(config.settle_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::Replacing.to_string(), "replacing");
        assert_eq!(SessionState::Failed.as_str(), "failed");
    }
}
