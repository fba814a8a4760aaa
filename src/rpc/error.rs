//! JSON-RPC error objects.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::Error;

use super::types::{Id, JSON_RPC_VERSION};

/// Failure of one JSON-RPC call.
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Parse error: {0}")]
    ParseBody(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Expected jsonrpc set to '2.0'")]
    InvalidVersion,
    #[error("Method '{0}' in request was not found")]
    MethodNotFound(String),
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Bridge(#[from] Error),
}

impl RpcError {
    /// Returns the JSON-RPC error code.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::ParseBody(_) => -32700,
            Self::InvalidRequest(_) | Self::InvalidVersion => -32600,
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) => -32602,
            Self::Internal(_) => -32603,
            Self::Bridge(error) => match error {
                Error::Decode { .. } => -32602,
                Error::Remote { .. } => -32000,
                Error::Session { .. } | Error::NoActiveSession => -32001,
                Error::Connection { .. }
                | Error::ConnectionTimeout { .. }
                | Error::ConnectionClosed
                | Error::Protocol { .. }
                | Error::RequestTimeout { .. }
                | Error::WebSocket(_) => -32002,
                Error::Config { .. }
                | Error::BrowserNotFound { .. }
                | Error::ProcessLaunchFailed { .. }
                | Error::Io(_)
                | Error::Json(_) => -32603,
            },
        }
    }

    /// Creates an invalid params error.
    #[inline]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    /// Creates an internal error.
    #[inline]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

/// An error bound to the request it answers.
#[derive(Debug)]
pub struct RpcResponseError {
    id: Id,
    error: RpcError,
}

impl RpcResponseError {
    pub fn new(id: Id, error: impl Into<RpcError>) -> Self {
        Self {
            id,
            error: error.into(),
        }
    }

    #[must_use]
    pub fn error(&self) -> &RpcError {
        &self.error
    }

    /// Builds the error response object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut error = Map::new();
        error.insert("code".to_string(), Value::from(self.error.code()));
        error.insert("message".to_string(), Value::String(self.error.to_string()));

        let mut obj = Map::new();
        obj.insert("jsonrpc".to_string(), Value::from(JSON_RPC_VERSION));
        obj.insert("error".to_string(), Value::Object(error));
        obj.insert("id".to_string(), self.id.to_json());
        Value::Object(obj)
    }
}
