//! Method registry and request dispatch.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use futures_util::future::{BoxFuture, join_all};
use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::{debug, trace, warn};

use super::error::{RpcError, RpcResponseError};
use super::types::{Id, JSON_RPC_VERSION, RpcRequest, success};

// ============================================================================
// Types
// ============================================================================

/// Future returned by a registered method.
pub type HandlerFuture = BoxFuture<'static, Result<Value, RpcError>>;

/// A registered method: shared data plus raw params in, result out.
pub type Handler<T> = Box<dyn Fn(T, Value) -> HandlerFuture + Send + Sync>;

/// Wraps an `async fn(T, Value) -> Result<Value, RpcError>` as a [`Handler`].
#[macro_export]
macro_rules! async_handler {
    ($func:expr) => {
        Box::new(move |data, params| {
            let future: $crate::rpc::handler::HandlerFuture = Box::pin($func(data, params));
            future
        })
    };
}

// ============================================================================
// RpcHandler
// ============================================================================

/// JSON-RPC dispatcher over a method table.
pub struct RpcHandler<T> {
    methods: FxHashMap<&'static str, Handler<T>>,
    data: T,
}

impl<T> fmt::Debug for RpcHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.methods.keys().collect();
        methods.sort();
        f.debug_struct("RpcHandler")
            .field("methods", &methods)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> RpcHandler<T> {
    pub fn new(data: T) -> Self {
        Self {
            methods: FxHashMap::default(),
            data,
        }
    }

    pub fn get_data(&self) -> &T {
        &self.data
    }

    /// Registers `handler` under `name`, replacing any previous one.
    pub fn register_method(&mut self, name: &'static str, handler: Handler<T>) {
        if self.methods.insert(name, handler).is_some() {
            warn!(method = name, "Method registered twice");
        }
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Handles a raw request body.
    ///
    /// Returns `None` when nothing should be sent back: a single
    /// notification. A batch always yields an array, empty when the batch
    /// was empty or held only notifications.
    pub async fn handle_request(&self, body: &[u8]) -> Option<Value> {
        let request: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "Unparsable request body");
                return Some(RpcResponseError::new(Id::Null, RpcError::ParseBody(e.to_string())).to_json());
            }
        };

        match request {
            Value::Array(batch) => {
                trace!(size = batch.len(), "Dispatching batch");
                let responses = join_all(batch.into_iter().map(|item| self.handle_value(item))).await;
                Some(Value::Array(responses.into_iter().flatten().collect()))
            }
            single => self.handle_value(single).await,
        }
    }

    /// Handles one decoded call.
    pub async fn handle_value(&self, value: Value) -> Option<Value> {
        let fallback_id = id_of(&value);
        let request: RpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(
                    RpcResponseError::new(fallback_id, RpcError::InvalidRequest(e.to_string()))
                        .to_json(),
                );
            }
        };

        let notification = request.is_notification();
        let id = request.id.clone().unwrap_or(Id::Null);

        match self.execute(request).await {
            _ if notification => None,
            Ok(result) => Some(success(&id, result)),
            Err(error) => Some(RpcResponseError::new(id, error).to_json()),
        }
    }

    async fn execute(&self, request: RpcRequest) -> Result<Value, RpcError> {
        if request.jsonrpc != JSON_RPC_VERSION {
            return Err(RpcError::InvalidVersion);
        }

        let handler = self
            .methods
            .get(request.method.as_str())
            .ok_or_else(|| RpcError::MethodNotFound(request.method.clone()))?;

        trace!(method = %request.method, "Executing");
        let result = handler(self.data.clone(), request.params).await;
        if let Err(e) = &result {
            debug!(method = %request.method, code = e.code(), error = %e, "Method failed");
        }
        result
    }
}

/// Best-effort id of a request that failed to parse.
fn id_of(value: &Value) -> Id {
    value
        .get("id")
        .and_then(|id| serde_json::from_value(id.clone()).ok())
        .unwrap_or(Id::Null)
}

// ============================================================================
// Tests
// ============================================================================
