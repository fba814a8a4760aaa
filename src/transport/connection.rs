//! Agent link.
//!
//! Replies are matched to requests by [`RequestId`]. A request enters its
//! reply channel in the shared pending table before its frame is queued, and
//! leaves it when it is answered, times out or is dropped. The socket task
//! only moves frames: outgoing text from the queue, incoming replies to the
//! table.
//!
//! The READY handshake is the reply to the nil ID. It is registered before
//! the socket task starts, so it cannot arrive unclaimed.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::{Request, Response};

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for page-management commands.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Requests allowed in flight at once.
const MAX_PENDING_REQUESTS: usize = 100;

/// How long the agent has to send READY after connecting.
const READY_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Types
// ============================================================================

/// Reply channels by request.
type PendingTable = Mutex<FxHashMap<RequestId, oneshot::Sender<Response>>>;

/// Work for the socket task.
enum Outgoing {
    Frame(String),
    Close,
}

/// Agent details from the READY handshake.
#[derive(Debug, Clone)]
pub struct ReadyData {
    /// Agent session number, informational only.
    pub session_id: u64,
}

// ============================================================================
// Registration
// ============================================================================

/// A pending-table entry, removed when the waiting request goes away.
struct Registration<'a> {
    table: &'a PendingTable,
    id: RequestId,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.table.lock().remove(&self.id);
    }
}

fn register(
    table: &PendingTable,
    id: RequestId,
    reply: oneshot::Sender<Response>,
) -> Result<Registration<'_>> {
    let mut pending = table.lock();
    if pending.len() >= MAX_PENDING_REQUESTS {
        warn!(max = MAX_PENDING_REQUESTS, "Agent request limit reached");
        return Err(Error::protocol(format!(
            "too many requests in flight (limit {MAX_PENDING_REQUESTS})"
        )));
    }
    pending.insert(id, reply);
    Ok(Registration { table, id })
}

// ============================================================================
// Connection
// ============================================================================

/// WebSocket link to the browser agent.
///
/// Clones share the same socket task.
#[derive(Clone)]
pub struct Connection {
    outgoing: mpsc::UnboundedSender<Outgoing>,
    pending: Arc<PendingTable>,
}

impl Connection {
    /// Starts the socket task and waits for the agent's READY.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if READY does not arrive in time
    /// - [`Error::ConnectionClosed`] if the agent leaves first
    pub(crate) async fn open(ws_stream: WebSocketStream<TcpStream>) -> Result<(Self, ReadyData)> {
        let (outgoing, queue) = mpsc::unbounded_channel();
        let pending = Arc::new(PendingTable::default());

        let (ready_tx, ready_rx) = oneshot::channel();
        let registration = register(&pending, RequestId::ready(), ready_tx)?;

        tokio::spawn(run_socket(ws_stream, queue, Arc::clone(&pending)));

        let ready = timeout(READY_TIMEOUT, ready_rx)
            .await
            .map_err(|_| Error::connection_timeout(READY_TIMEOUT.as_millis() as u64))?
            .map_err(|_| Error::ConnectionClosed)?;
        drop(registration);

        let session_id = ready.get_u64("sessionId").unwrap_or_default();
        debug!(session_id, "READY received");

        Ok((Self { outgoing, pending }, ReadyData { session_id }))
    }

    /// Sends `request` and waits for its reply.
    ///
    /// `None` waits until the agent answers or the link drops.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the link is down
    /// - [`Error::RequestTimeout`] if no reply arrives within `request_timeout`
    /// - [`Error::Protocol`] if too many requests are in flight
    pub async fn send(
        &self,
        request: Request,
        request_timeout: Option<Duration>,
    ) -> Result<Response> {
        let id = request.id;
        let method = request.command.method();
        let frame = serde_json::to_string(&request)?;

        let (reply_tx, reply_rx) = oneshot::channel();
        let _registration = register(&self.pending, id, reply_tx)?;

        self.outgoing
            .send(Outgoing::Frame(frame))
            .map_err(|_| Error::ConnectionClosed)?;
        trace!(request_id = %id, method, "Request queued");

        let reply = match request_timeout {
            Some(limit) => timeout(limit, reply_rx)
                .await
                .map_err(|_| Error::request_timeout(id, limit.as_millis() as u64))?,
            None => reply_rx.await,
        };
        reply.map_err(|_| Error::ConnectionClosed)
    }

    /// Requests currently waiting for a reply.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Returns `true` once the socket task has ended.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.outgoing.is_closed()
    }

    /// Closes the socket. Waiting requests fail with
    /// [`Error::ConnectionClosed`].
    pub fn shutdown(&self) {
        let _ = self.outgoing.send(Outgoing::Close);
    }
}

// ============================================================================
// Socket Task
// ============================================================================

async fn run_socket(
    ws_stream: WebSocketStream<TcpStream>,
    mut queue: mpsc::UnboundedReceiver<Outgoing>,
    pending: Arc<PendingTable>,
) {
    let (mut sink, mut stream) = ws_stream.split();

    loop {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => deliver(&text, &pending),
                Some(Ok(Message::Close(_))) | None => {
                    debug!("Agent closed the socket");
                    break;
                }
                Some(Err(e)) => {
                    error!(error = %e, "Agent socket failed");
                    break;
                }
                Some(Ok(_)) => {}
            },

            outgoing = queue.recv() => match outgoing {
                Some(Outgoing::Frame(frame)) => {
                    if let Err(e) = sink.send(Message::Text(frame.into())).await {
                        error!(error = %e, "Failed to write to agent");
                        break;
                    }
                }
                Some(Outgoing::Close) | None => {
                    let _ = sink.close().await;
                    break;
                }
            },
        }
    }

    queue.close();
    // Dropping the senders fails every waiting request.
    let abandoned = pending.lock().drain().count();
    debug!(abandoned, "Agent link closed");
}

/// Hands one reply to its waiting request.
fn deliver(text: &str, pending: &PendingTable) {
    let response = match serde_json::from_str::<Response>(text) {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Unreadable agent message");
            return;
        }
    };

    match pending.lock().remove(&response.id) {
        Some(reply) => {
            let _ = reply.send(response);
        }
        None => debug!(request_id = %response.id, "Reply without a waiting request"),
    }
}

// ============================================================================
// Tests
// ============================================================================
