//! JSON-RPC 2.0 front end.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Request envelope and ids |
//! | [`error`] | Error objects and codes |
//! | [`params`] | Positional parameter parsing |
//! | [`handler`] | Method registry and batch dispatch |
//! | [`methods`] | Light client methods |
//! | [`server`] | actix-web endpoint |
//!
//! # Error Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | -32700 | Unparsable body |
//! | -32600 | Invalid request or version |
//! | -32601 | Unknown method |
//! | -32602 | Invalid params, malformed wire value |
//! | -32603 | Internal error |
//! | -32000 | The client rejected the call; message passed through |
//! | -32001 | No usable session |
//! | -32002 | Browser agent unreachable or timed out |

// ============================================================================
// Submodules
// ============================================================================

pub mod error;
pub mod handler;
pub mod methods;
pub mod params;
pub mod server;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{RpcError, RpcResponseError};
pub use handler::{Handler, RpcHandler};
pub use methods::{Session, register_methods};
pub use params::Params;
pub use server::{DEFAULT_BODY_LIMIT, configure, json_rpc, serve};
pub use types::{Id, JSON_RPC_VERSION, RpcRequest};
