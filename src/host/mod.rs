//! Remote execution host.
//!
//! The host owns the pages the light client runs in. The session manager
//! only ever talks to it through [`ExecutionHost`], so tests can swap the
//! browser for a scripted double.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `browser` | [`BrowserHost`], the agent-backed implementation |
//! | `builder` | [`HostBuilder`] with validation |
//! | `launcher` | Browser process spawning |
//! | `script` | Page-side functions |

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::identifiers::PageId;

// ============================================================================
// Submodules
// ============================================================================

/// Agent-backed host.
pub mod browser;

/// Builder for [`BrowserHost`].
pub mod builder;

/// Browser process spawning.
pub mod launcher;

/// Page-side functions.
pub mod script;

#[cfg(test)]
pub(crate) mod scripted;

// ============================================================================
// Re-exports
// ============================================================================

pub use browser::{BrowserHost, DEFAULT_EVALUATE_TIMEOUT};
pub use builder::HostBuilder;
pub use launcher::Launcher;

// ============================================================================
// ExecutionHost
// ============================================================================

/// Page lifecycle and in-page evaluation.
///
/// Every page is isolated from the others; closing one discards its storage.
#[async_trait]
pub trait ExecutionHost: Send + Sync {
    /// Creates a fresh isolated page.
    async fn open_page(&self) -> Result<PageId>;

    /// Closes a page.
    async fn close_page(&self, page: PageId) -> Result<()>;

    /// Navigates a page and waits for it to load.
    async fn navigate(&self, page: PageId, url: &str) -> Result<()>;

    /// Clicks the button named `control`.
    async fn trigger_control(&self, page: PageId, control: &str) -> Result<()>;

    /// Calls the function expression `function` with `args` and returns its
    /// resolved value.
    async fn evaluate(&self, page: PageId, function: &str, args: Value) -> Result<Value>;

    /// Releases host resources.
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// NetworkMode
// ============================================================================

/// Which network the light client joins after initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkMode {
    /// Public network, started with the standard control.
    #[default]
    Standard,
    /// Local development chain.
    Development,
}

impl NetworkMode {
    /// Returns a human-readable name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Development => "development",
        }
    }
}

impl std::fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NetworkMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "development" | "dev" => Ok(Self::Development),
            other => Err(format!("unknown network mode: {other}")),
        }
    }
}
