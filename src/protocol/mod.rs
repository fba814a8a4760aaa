//! WebSocket protocol message types.
//!
//! This module defines the message format for communication between the
//! bridge (Rust) and the browser agent that hosts the light client pages.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Bridge → Agent | Command request |
//! | `Response` | Agent → Bridge | Command response |
//!
//! The agent opens the connection and announces itself with a READY
//! response whose `id` is the nil UUID.
//!
//! # Command Naming
//!
//! Commands follow `module.methodName` format:
//!
//! - `context.create`
//! - `browsingContext.navigate`
//! - `script.evaluate`
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Command definitions by domain |
//! | `request` | Request and Response types |

// ============================================================================
// Submodules
// ============================================================================

/// Command definitions organized by module.
pub mod command;

/// Request and Response message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{BrowsingContextCommand, Command, ContextCommand, InputCommand, ScriptCommand};
pub use request::{Request, Response, ResponseType};
