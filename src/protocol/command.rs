//! Command definitions organized by module.
//!
//! Commands follow the `module.methodName` format.
//!
//! # Command Modules
//!
//! | Module | Commands |
//! |--------|----------|
//! | `context` | Create and close isolated pages |
//! | `browsingContext` | Navigation |
//! | `input` | Accessible control activation |
//! | `script` | Function evaluation |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Command Wrapper
// ============================================================================

/// All protocol commands organized by module.
///
/// This enum wraps module-specific command enums for unified serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    /// Context module commands.
    Context(ContextCommand),
    /// BrowsingContext module commands.
    BrowsingContext(BrowsingContextCommand),
    /// Input module commands.
    Input(InputCommand),
    /// Script module commands.
    Script(ScriptCommand),
}

impl Command {
    /// Returns the `module.methodName` of this command.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Context(ContextCommand::Create) => "context.create",
            Self::Context(ContextCommand::Close) => "context.close",
            Self::BrowsingContext(BrowsingContextCommand::Navigate { .. }) => {
                "browsingContext.navigate"
            }
            Self::Input(InputCommand::ClickControl { .. }) => "input.clickControl",
            Self::Script(ScriptCommand::Evaluate { .. }) => "script.evaluate",
        }
    }

    /// Returns `true` for commands that may run for as long as the page does.
    #[inline]
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Script(_))
    }
}

// ============================================================================
// Context Commands
// ============================================================================

/// Context module commands for page lifetime.
///
/// Every page lives in its own browser context, so closing a page also drops
/// its storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum ContextCommand {
    /// Create a fresh context with one blank page.
    ///
    /// Result: `{"pageId": n}`.
    #[serde(rename = "context.create")]
    Create,

    /// Close the addressed page and its context.
    #[serde(rename = "context.close")]
    Close,
}

// ============================================================================
// BrowsingContext Commands
// ============================================================================

/// BrowsingContext module commands for navigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum BrowsingContextCommand {
    /// Navigate to URL and wait for load.
    #[serde(rename = "browsingContext.navigate")]
    Navigate {
        /// URL to navigate to.
        url: String,
    },
}

// ============================================================================
// Input Commands
// ============================================================================

/// Input module commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum InputCommand {
    /// Click the control with the given accessible role and name.
    #[serde(rename = "input.clickControl")]
    ClickControl {
        /// ARIA role, e.g. `button`.
        role: String,
        /// Accessible name.
        name: String,
    },
}

impl InputCommand {
    /// Clicks the button named `name`.
    #[inline]
    #[must_use]
    pub fn click_button(name: impl Into<String>) -> Self {
        Self::ClickControl {
            role: "button".to_string(),
            name: name.into(),
        }
    }
}

// ============================================================================
// Script Commands
// ============================================================================

/// Script module commands for JavaScript execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum ScriptCommand {
    /// Call a function in the page and await its result.
    ///
    /// `script` is a function expression; it is invoked with `args` after the
    /// agent revives `$bigint` and `$undefined` markers. Result:
    /// `{"value": …}`.
    #[serde(rename = "script.evaluate")]
    Evaluate {
        /// Function expression.
        script: String,
        /// Single argument passed to the function.
        #[serde(default)]
        args: Value,
    },
}

// ============================================================================
// Tests
// ============================================================================
