//! Request and Response message types.
//!
//! Defines the message format for command requests and responses between
//! the bridge and the browser agent.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::{PageId, RequestId};

use super::Command;

// ============================================================================
// Request
// ============================================================================

/// A command request from the bridge to the agent.
///
/// # Format
///
/// ```json
/// {
///   "id": "uuid",
///   "method": "module.methodName",
///   "pageId": 1,
///   "params": { ... }
/// }
/// ```
///
/// `pageId` is omitted for commands that do not address a page.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Unique identifier for request/response correlation.
    pub id: RequestId,

    /// Target page.
    #[serde(rename = "pageId", skip_serializing_if = "Option::is_none")]
    pub page_id: Option<PageId>,

    /// Command with method and params.
    #[serde(flatten)]
    pub command: Command,
}

impl Request {
    /// Creates a request addressed to `page_id`.
    #[inline]
    #[must_use]
    pub fn new(page_id: PageId, command: Command) -> Self {
        Self {
            id: RequestId::generate(),
            page_id: Some(page_id),
            command,
        }
    }

    /// Creates a request that does not address a page.
    #[inline]
    #[must_use]
    pub fn global(command: Command) -> Self {
        Self {
            id: RequestId::generate(),
            page_id: None,
            command,
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// A response from the agent.
///
/// # Format
///
/// Success:
/// ```json
/// {
///   "id": "uuid",
///   "type": "success",
///   "result": { ... }
/// }
/// ```
///
/// Error:
/// ```json
/// {
///   "id": "uuid",
///   "type": "error",
///   "error": "error code",
///   "message": "error message"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// Matches the command `id`.
    pub id: RequestId,

    /// Response type.
    #[serde(rename = "type")]
    pub response_type: ResponseType,

    /// Result data (if success).
    #[serde(default)]
    pub result: Option<Value>,

    /// Error code (if error).
    #[serde(default)]
    pub error: Option<String>,

    /// Error message (if error).
    #[serde(default)]
    pub message: Option<String>,
}

/// Error code reported when the evaluated function threw or rejected.
pub const SCRIPT_ERROR: &str = "script error";

impl Response {
    /// Returns `true` if this is a success response.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.response_type == ResponseType::Success
    }

    /// Extracts the result value, returning error if response was error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Remote`] with the page's message verbatim if the
    /// evaluated function failed, and [`Error::Protocol`] for any other
    /// agent error.
    pub fn into_result(self) -> Result<Value> {
        match self.response_type {
            ResponseType::Success => Ok(self.result.unwrap_or(Value::Null)),
            ResponseType::Error => {
                let error_code = self.error.unwrap_or_else(|| "unknown error".to_string());
                let message = self.message.unwrap_or_else(|| error_code.clone());
                if error_code == SCRIPT_ERROR {
                    Err(Error::remote(message))
                } else {
                    Err(Error::protocol(format!("{error_code}: {message}")))
                }
            }
        }
    }

    /// Gets a u64 value from the result.
    ///
    /// Returns `None` if key not found or not a number.
    #[inline]
    #[must_use]
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.result
            .as_ref()
            .and_then(|v| v.get(key))
            .and_then(Value::as_u64)
    }
}

// ============================================================================
// ResponseType
// ============================================================================

/// Response type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Successful response.
    Success,
    /// Error response.
    Error,
}

// ============================================================================
// Tests
// ============================================================================
