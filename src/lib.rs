//! CKB light client RPC bridge.
//!
//! Serves the CKB light client JSON-RPC API on top of a light client running
//! inside a browser page.
//!
//! # Architecture
//!
//! ```text
//! caller --JSON-RPC/HTTP--> rpc --> session --> host --WebSocket--> browser agent
//!                            |                                          |
//!                        transform                               window.client
//! ```
//!
//! - **Dispatcher** ([`rpc`]): decodes wire parameters, forwards, encodes results
//! - **Transformer** ([`transform`]): wire (snake_case, hex) ⇄ domain (camelCase, BigInt)
//! - **Session manager** ([`session`]): owns the single client page, swaps it on demand
//! - **Execution host** ([`host`]): opens pages, clicks controls, evaluates functions
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ckb_light_client_rpc::host::{ExecutionHost, HostBuilder, NetworkMode};
//! use ckb_light_client_rpc::rpc::{DEFAULT_BODY_LIMIT, RpcHandler, register_methods, serve};
//! use ckb_light_client_rpc::{Result, SessionConfig, SessionManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let host: Arc<dyn ExecutionHost> = Arc::new(
//!         HostBuilder::new()
//!             .browser("/usr/bin/chromium", vec!["--headless=new".into()])
//!             .build()
//!             .await?,
//!     );
//!     let session = Arc::new(SessionManager::new(host, SessionConfig::default()));
//!     session.initialize(NetworkMode::Standard).await?;
//!
//!     let mut handler = RpcHandler::new(session);
//!     register_methods(&mut handler);
//!     let addr = "127.0.0.1:9000".parse().expect("addr");
//!     serve(addr, Arc::new(handler), DEFAULT_BODY_LIMIT)?.await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`rpc`] | JSON-RPC envelopes, method table, HTTP endpoint |
//! | [`schema`] | Wire and domain records |
//! | [`transform`] | Conversion between the two |
//! | [`session`] | Client page lifecycle |
//! | [`host`] | Execution host trait and browser implementation |
//! | [`config`] | Command line configuration |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Browser agent message types (internal) |
//! | [`transport`] | Browser agent WebSocket link (internal) |

// ============================================================================
// Modules
// ============================================================================

/// Command line and environment configuration.
pub mod config;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Remote execution host.
pub mod host;

/// Type-safe identifiers.
pub mod identifiers;

/// Browser agent message types.
pub mod protocol;

/// JSON-RPC front end.
pub mod rpc;

/// Wire and domain record shapes.
pub mod schema;

/// Light client session lifecycle.
pub mod session;

/// Wire ⇄ domain conversion.
pub mod transform;

/// Browser agent WebSocket transport.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Configuration
pub use config::Config;

// Error types
pub use error::{Error, Result};

// Host types
pub use host::{BrowserHost, ExecutionHost, HostBuilder, NetworkMode};

// Identifier types
pub use identifiers::{PageId, RequestId, SessionId};

// Session types
pub use session::{SessionConfig, SessionManager, SessionState};
