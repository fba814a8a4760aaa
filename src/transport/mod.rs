//! WebSocket transport layer.
//!
//! This module handles communication between the bridge (Rust) and the
//! browser agent via WebSocket.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Host (Rust)    │                              │  Browser agent  │
//! │                 │         WebSocket            │                 │
//! │  PendingServer  │◄────────────────────────────►│  pages running  │
//! │  → Connection   │      localhost:PORT          │  window.client  │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `PendingServer::bind` - Bind to the configured address
//! 2. Start the browser with the agent URL (or wait for an external one)
//! 3. `PendingServer::accept` - Wait for the agent to connect and send READY
//! 4. `Connection` - Send requests, match replies by ID
//! 5. `Connection::shutdown` - Close the socket
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Agent link and reply matching |
//! | `server` | WebSocket server binding and acceptance |

// ============================================================================
// Submodules
// ============================================================================

/// Agent link and reply matching.
pub mod connection;

/// WebSocket server for the browser agent.
pub mod server;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, DEFAULT_COMMAND_TIMEOUT, ReadyData};
pub use server::{CONNECTION_TIMEOUT, PendingServer};
