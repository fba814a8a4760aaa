//! Agent-backed execution host.
//!
//! Each page is a separate browser context created through the agent, so a
//! replaced light client never shares storage with its predecessor.
//!
//! # Example
//!
//! ```ignore
//! use ckb_light_client_rpc::host::{ExecutionHost, HostBuilder};
//!
//! let host = HostBuilder::new().port(9100).build().await?;
//! let page = host.open_page().await?;
//! host.navigate(page, "http://localhost:8000").await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::identifiers::PageId;
use crate::protocol::{
    BrowsingContextCommand, Command, ContextCommand, InputCommand, Request, Response,
    ScriptCommand,
};
use crate::transport::{Connection, DEFAULT_COMMAND_TIMEOUT};

use super::ExecutionHost;
use super::launcher::LaunchedBrowser;

// ============================================================================
// Constants
// ============================================================================

/// Default bound on a single in-page evaluation.
///
/// Light client calls answer from local state or report `fetching`, so an
/// evaluation running this long means the page is wedged.
pub const DEFAULT_EVALUATE_TIMEOUT: Duration = Duration::from_secs(120);

// ============================================================================
// BrowserHost
// ============================================================================

/// Execution host driving a browser agent over WebSocket.
pub struct BrowserHost {
    /// Agent connection.
    connection: Connection,
    /// Browser process, when this host launched it.
    browser: Mutex<Option<LaunchedBrowser>>,
    /// Timeout for `script.evaluate`; `None` waits indefinitely.
    evaluate_timeout: Option<Duration>,
}

impl fmt::Debug for BrowserHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserHost")
            .field("evaluate_timeout", &self.evaluate_timeout)
            .field("pending", &self.connection.pending_count())
            .finish_non_exhaustive()
    }
}

impl BrowserHost {
    /// Creates a host over an established agent connection.
    pub(crate) fn new(
        connection: Connection,
        browser: Option<LaunchedBrowser>,
        evaluate_timeout: Option<Duration>,
    ) -> Self {
        Self {
            connection,
            browser: Mutex::new(browser),
            evaluate_timeout,
        }
    }

    /// Sends a page-management command with the default timeout.
    async fn send_command(&self, page: Option<PageId>, command: Command) -> Result<Response> {
        let request = match page {
            Some(page) => Request::new(page, command),
            None => Request::global(command),
        };
        self.connection
            .send(request, Some(DEFAULT_COMMAND_TIMEOUT))
            .await
    }
}

#[async_trait]
impl ExecutionHost for BrowserHost {
    async fn open_page(&self) -> Result<PageId> {
        let response = self
            .send_command(None, Command::Context(ContextCommand::Create))
            .await?;
        let result = response.into_result()?;

        let page = result
            .get("pageId")
            .and_then(Value::as_u64)
            .and_then(|raw| u32::try_from(raw).ok())
            .map(PageId::new)
            .ok_or_else(|| Error::protocol("Expected pageId in context.create response"))?;

        debug!(page_id = %page, "Page opened");
        Ok(page)
    }

    async fn close_page(&self, page: PageId) -> Result<()> {
        self.send_command(Some(page), Command::Context(ContextCommand::Close))
            .await?
            .into_result()?;
        debug!(page_id = %page, "Page closed");
        Ok(())
    }

    async fn navigate(&self, page: PageId, url: &str) -> Result<()> {
        debug!(page_id = %page, url, "Navigating");
        let command = Command::BrowsingContext(BrowsingContextCommand::Navigate {
            url: url.to_string(),
        });
        self.send_command(Some(page), command)
            .await?
            .into_result()?;
        Ok(())
    }

    async fn trigger_control(&self, page: PageId, control: &str) -> Result<()> {
        debug!(page_id = %page, control, "Triggering control");
        let command = Command::Input(InputCommand::click_button(control));
        self.send_command(Some(page), command)
            .await?
            .into_result()?;
        Ok(())
    }

    async fn evaluate(&self, page: PageId, function: &str, args: Value) -> Result<Value> {
        let command = Command::Script(ScriptCommand::Evaluate {
            script: function.to_string(),
            args,
        });
        let response = self
            .connection
            .send(Request::new(page, command), self.evaluate_timeout)
            .await?;

        let mut result = response.into_result()?;
        Ok(result.get_mut("value").map(Value::take).unwrap_or(Value::Null))
    }

    async fn shutdown(&self) -> Result<()> {
        self.connection.shutdown();
        if let Some(mut browser) = self.browser.lock().await.take() {
            browser.process.kill().await;
        }
        info!("Host shut down");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;

    use futures_util::{SinkExt, StreamExt};
    use parking_lot::Mutex as SyncMutex;
    use serde_json::json;
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::Message;

    use crate::identifiers::RequestId;
    use crate::transport::PendingServer;

    /// Starts a fake agent that records every request and answers from a
    /// small in-memory page model.
    async fn host_with_agent(
        evaluate_timeout: Option<Duration>,
    ) -> (BrowserHost, Arc<SyncMutex<Vec<Value>>>) {
        let server = PendingServer::bind(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
            .await
            .expect("bind");
        let url = server.ws_url();
        let seen = Arc::new(SyncMutex::new(Vec::new()));
        let log = Arc::clone(&seen);

        tokio::spawn(async move {
            let (mut ws, _) = connect_async(url).await.expect("connect");
            let ready = json!({"id": RequestId::ready(), "type": "success", "result": {}});
            ws.send(Message::Text(ready.to_string().into()))
                .await
                .expect("ready");

            let mut next_page = 1;
            while let Some(Ok(Message::Text(text))) = ws.next().await {
                let request: Value = serde_json::from_str(&text).expect("json");
                log.lock().push(request.clone());

                let reply = match request["method"].as_str() {
                    Some("context.create") => {
                        next_page += 1;
                        json!({"id": request["id"], "type": "success", "result": {"pageId": next_page - 1}})
                    }
                    Some("script.evaluate") if request["params"]["args"]["method"] == "hang" => {
                        continue;
                    }
                    Some("script.evaluate") if request["params"]["args"]["method"] == "fail" => json!({
                        "id": request["id"],
                        "type": "error",
                        "error": "script error",
                        "message": "boom",
                    }),
                    Some("script.evaluate") => json!({
                        "id": request["id"],
                        "type": "success",
                        "result": {"value": {"echo": request["params"]["args"]}},
                    }),
                    _ => json!({"id": request["id"], "type": "success", "result": {}}),
                };
                ws.send(Message::Text(reply.to_string().into()))
                    .await
                    .expect("reply");
            }
        });

        let (connection, _) = server.accept().await.expect("accept");
        (BrowserHost::new(connection, None, evaluate_timeout), seen)
    }

    #[tokio::test]
    async fn test_page_lifecycle_commands() {
        let (host, seen) = host_with_agent(None).await;

        let page = host.open_page().await.expect("open");
        assert_eq!(page, PageId::new(1));
        host.navigate(page, "http://localhost:8000")
            .await
            .expect("navigate");
        host.trigger_control(page, "Initialize workers")
            .await
            .expect("click");
        host.close_page(page).await.expect("close");

        let seen = seen.lock();
        let methods: Vec<_> = seen.iter().map(|r| r["method"].clone()).collect();
        assert_eq!(
            methods,
            [
                json!("context.create"),
                json!("browsingContext.navigate"),
                json!("input.clickControl"),
                json!("context.close"),
            ]
        );
        assert!(seen[0].get("pageId").is_none());
        assert_eq!(seen[1]["pageId"], json!(1));
        assert_eq!(seen[2]["params"]["name"], json!("Initialize workers"));
    }

    #[tokio::test]
    async fn test_evaluate_returns_value() {
        let (host, _) = host_with_agent(None).await;
        let page = host.open_page().await.expect("open");

        let value = host
            .evaluate(page, "async (a) => a", json!({"method": "getPeers", "args": []}))
            .await
            .expect("evaluate");
        assert_eq!(value["echo"]["method"], json!("getPeers"));
    }

    #[tokio::test]
    async fn test_evaluate_error_is_remote() {
        let (host, _) = host_with_agent(None).await;
        let page = host.open_page().await.expect("open");

        let err = host
            .evaluate(page, "async (a) => a", json!({"method": "fail"}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(matches!(err, Error::Remote { .. }));
    }

    #[tokio::test]
    async fn test_unanswered_evaluate_times_out() {
        let (host, _) = host_with_agent(Some(Duration::from_millis(50))).await;
        let page = host.open_page().await.expect("open");

        let err = host
            .evaluate(page, "async (a) => a", json!({"method": "hang"}))
            .await
            .unwrap_err();
        assert!(err.is_timeout(), "{err}");

        let value = host
            .evaluate(page, "async (a) => a", json!({"method": "getPeers"}))
            .await
            .expect("evaluate after timeout");
        assert_eq!(value["echo"]["method"], json!("getPeers"));
    }
}
