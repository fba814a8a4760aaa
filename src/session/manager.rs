//! Session manager.
//!
//! The active page sits in an async `RwLock` slot. Remote calls read the
//! page under the read guard and release it before evaluating, so a slow or
//! hung call never holds up `replace`, `start` or `stop`. Lifecycle
//! operations take the write guard: a call issued during a replacement waits
//! for the new page and can never be dispatched to the closed one. A call
//! already running on a page that gets closed fails with the host's error.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, info, trace, warn};

use crate::error::{Error, Result};
use crate::host::script::{CALL_CLIENT, client_call};
use crate::host::{ExecutionHost, NetworkMode};
use crate::identifiers::{PageId, SessionId};

use super::{SessionConfig, SessionState};

// ============================================================================
// ActivePage
// ============================================================================

/// The page currently hosting the client.
#[derive(Debug, Clone, Copy)]
struct ActivePage {
    session: SessionId,
    page: PageId,
    mode: NetworkMode,
}

// ============================================================================
// SessionManager
// ============================================================================

/// Owns the single light client page.
pub struct SessionManager {
    /// Page host.
    host: Arc<dyn ExecutionHost>,
    /// Client location and controls.
    config: SessionConfig,
    /// Active page; `None` before initialization and after a failure.
    slot: RwLock<Option<ActivePage>>,
    /// Observable state, only written under the slot's write guard.
    state: Mutex<SessionState>,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("client_url", &self.config.client_url)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SessionManager - Public API
// ============================================================================

impl SessionManager {
    /// Creates a manager with no page.
    #[must_use]
    pub fn new(host: Arc<dyn ExecutionHost>, config: SessionConfig) -> Self {
        Self {
            host,
            config,
            slot: RwLock::new(None),
            state: Mutex::new(SessionState::Uninitialized),
        }
    }

    /// Returns the current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Returns the active session ID, waiting out any lifecycle operation.
    pub async fn session_id(&self) -> Option<SessionId> {
        self.slot.read().await.map(|active| active.session)
    }

    /// Returns the active page, waiting out any lifecycle operation.
    pub async fn page(&self) -> Option<PageId> {
        self.slot.read().await.map(|active| active.page)
    }

    /// Opens the first page and starts the client in `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Session`] if a session already exists or the client
    /// fails to come up.
    pub async fn initialize(&self, mode: NetworkMode) -> Result<SessionId> {
        let mut slot = self.slot.write().await;

        let state = self.state();
        if slot.is_some() || state != SessionState::Uninitialized {
            return Err(Error::session(format!(
                "cannot initialize, session is {state}"
            )));
        }

        self.set_state(SessionState::Initializing);
        self.bring_up(&mut slot, mode).await
    }

    /// Closes the current page and starts a fresh client in `mode`.
    ///
    /// Also the only way out of [`SessionState::Failed`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Session`] if the new client fails to come up.
    pub async fn replace(&self, mode: NetworkMode) -> Result<SessionId> {
        let mut slot = self.slot.write().await;
        self.set_state(SessionState::Replacing);

        if let Some(old) = slot.take() {
            info!(session_id = %old.session, page_id = %old.page, "Closing previous client page");
            if let Err(e) = self.host.close_page(old.page).await {
                warn!(page_id = %old.page, error = %e, "Failed to close previous page");
            }
        }

        self.set_state(SessionState::Initializing);
        self.bring_up(&mut slot, mode).await
    }

    /// Clicks the current mode's initialization control again.
    ///
    /// # Errors
    ///
    /// - [`Error::NoActiveSession`] if there is no page
    /// - [`Error::Session`] if the click fails; the page is discarded
    pub async fn start(&self) -> Result<()> {
        let mut slot = self.slot.write().await;
        let Some(active) = *slot else {
            return Err(self.unavailable());
        };

        self.set_state(SessionState::Initializing);
        match self.trigger(active.page, active.mode).await {
            Ok(()) => {
                self.set_state(SessionState::Ready);
                info!(session_id = %active.session, "Client started");
                Ok(())
            }
            Err(e) => {
                slot.take();
                self.discard_page(active.page).await;
                self.set_state(SessionState::Failed);
                error!(session_id = %active.session, error = %e, "Client start failed");
                Err(Error::session(format!("failed to start client: {e}")))
            }
        }
    }

    /// Forwards `client.stop()`.
    ///
    /// The page stays attached; whatever the stopped client answers to later
    /// calls is passed through.
    ///
    /// # Errors
    ///
    /// - [`Error::NoActiveSession`] if there is no page
    /// - [`Error::Remote`] if the client rejects
    pub async fn stop(&self) -> Result<()> {
        let active = self.active().await?;

        self.host
            .evaluate(active.page, CALL_CLIENT, client_call("stop", Vec::new()))
            .await?;

        let slot = self.slot.write().await;
        if slot.is_some_and(|current| current.session == active.session) {
            self.set_state(SessionState::Stopped);
            info!(session_id = %active.session, "Client stopped");
        } else {
            debug!(session_id = %active.session, "Stopped client was replaced meanwhile");
        }
        Ok(())
    }

    /// Evaluates `function` with `args` on the active page.
    ///
    /// # Errors
    ///
    /// - [`Error::NoActiveSession`] if there is no page
    /// - [`Error::Session`] if the last lifecycle operation failed
    /// - whatever the host reports for the evaluation
    pub async fn call(&self, function: &str, args: Value) -> Result<Value> {
        let active = self.active().await?;

        trace!(session_id = %active.session, page_id = %active.page, "Forwarding call");
        self.host.evaluate(active.page, function, args).await
    }

    /// Calls `window.client[method](...args)` on the active page.
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn call_client(&self, method: &str, args: Vec<Value>) -> Result<Value> {
        debug!(method, "Calling client");
        self.call(CALL_CLIENT, client_call(method, args)).await
    }

    /// Closes the page and releases the host.
    ///
    /// # Errors
    ///
    /// Returns whatever the host reports while shutting down.
    pub async fn shutdown(&self) -> Result<()> {
        let mut slot = self.slot.write().await;
        if let Some(active) = slot.take() {
            self.discard_page(active.page).await;
        }
        self.set_state(SessionState::Uninitialized);
        info!("Session shut down");
        self.host.shutdown().await
    }
}

// ============================================================================
// SessionManager - Internal
// ============================================================================

impl SessionManager {
    fn set_state(&self, state: SessionState) {
        let previous = std::mem::replace(&mut *self.state.lock(), state);
        if previous != state {
            debug!(from = %previous, to = %state, "Session state changed");
        }
    }

    /// Copies the active page out, releasing the read guard before returning.
    async fn active(&self) -> Result<ActivePage> {
        let active = *self.slot.read().await;
        active.ok_or_else(|| self.unavailable())
    }

    /// Error for calls made without a page.
    fn unavailable(&self) -> Error {
        match self.state() {
            SessionState::Failed => Error::session(
                "last initialization failed, replace the session with new_client or new_dev_client",
            ),
            _ => Error::NoActiveSession,
        }
    }

    fn control(&self, mode: NetworkMode) -> &str {
        match mode {
            NetworkMode::Standard => &self.config.standard_control,
            NetworkMode::Development => &self.config.dev_control,
        }
    }

    /// Brings up a client and publishes it, or records the failure.
    async fn bring_up(&self, slot: &mut Option<ActivePage>, mode: NetworkMode) -> Result<SessionId> {
        match self.open_client(mode).await {
            Ok(active) => {
                *slot = Some(active);
                self.set_state(SessionState::Ready);
                info!(
                    session_id = %active.session,
                    page_id = %active.page,
                    %mode,
                    "Client ready"
                );
                Ok(active.session)
            }
            Err(e) => {
                self.set_state(SessionState::Failed);
                error!(%mode, error = %e, "Client initialization failed");
                Err(Error::session(format!("failed to start {mode} client: {e}")))
            }
        }
    }

    /// Opens a page, loads the client and clicks the mode's control.
    ///
    /// A page that fails half way is closed again.
    async fn open_client(&self, mode: NetworkMode) -> Result<ActivePage> {
        let page = self.host.open_page().await?;
        let session = SessionId::next();
        debug!(session_id = %session, page_id = %page, "Page opened for client");

        let started = async {
            self.host.navigate(page, &self.config.client_url).await?;
            self.trigger(page, mode).await
        }
        .await;

        if let Err(e) = started {
            self.discard_page(page).await;
            return Err(e);
        }

        Ok(ActivePage {
            session,
            page,
            mode,
        })
    }

    /// Clicks the control for `mode` and waits for the client to settle.
    async fn trigger(&self, page: PageId, mode: NetworkMode) -> Result<()> {
        self.host.trigger_control(page, self.control(mode)).await?;
        tokio::time::sleep(self.config.settle_delay).await;
        Ok(())
    }

    async fn discard_page(&self, page: PageId) {
        if let Err(e) = self.host.close_page(page).await {
            debug!(page_id = %page, error = %e, "Failed to close page");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use serde_json::json;

    use crate::host::scripted::{HostCall, ScriptedHost};
    use crate::session::DEFAULT_CLIENT_URL;

    fn manager_with(settle_delay: Duration) -> (Arc<SessionManager>, Arc<ScriptedHost>) {
        let host = Arc::new(ScriptedHost::new());
        let config = SessionConfig {
            settle_delay,
            ..SessionConfig::default()
        };
        let manager = SessionManager::new(Arc::clone(&host) as Arc<dyn ExecutionHost>, config);
        (Arc::new(manager), host)
    }

    fn manager() -> (Arc<SessionManager>, Arc<ScriptedHost>) {
        manager_with(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_initialize_opens_and_triggers() {
        let (manager, host) = manager();
        assert_eq!(manager.state(), SessionState::Uninitialized);

        manager
            .initialize(NetworkMode::Standard)
            .await
            .expect("initialize");

        assert_eq!(manager.state(), SessionState::Ready);
        let page = PageId::new(1);
        assert_eq!(
            host.calls(),
            [
                HostCall::Open(page),
                HostCall::Navigate(page, DEFAULT_CLIENT_URL.to_string()),
                HostCall::Trigger(page, "Initialize workers".to_string()),
            ]
        );
        assert_eq!(manager.page().await, Some(page));
    }

    #[tokio::test]
    async fn test_initialize_twice_fails() {
        let (manager, _) = manager();
        manager
            .initialize(NetworkMode::Standard)
            .await
            .expect("initialize");

        let err = manager.initialize(NetworkMode::Standard).await.unwrap_err();
        assert!(matches!(err, Error::Session { .. }));
        assert_eq!(manager.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_call_without_session() {
        let (manager, _) = manager();
        let err = manager.call_client("getTipHeader", Vec::new()).await.unwrap_err();
        assert!(matches!(err, Error::NoActiveSession));
    }

    #[tokio::test]
    async fn test_replace_leaves_one_page() {
        let (manager, host) = manager();
        let first = manager
            .initialize(NetworkMode::Standard)
            .await
            .expect("initialize");

        let second = manager
            .replace(NetworkMode::Development)
            .await
            .expect("replace");

        assert_ne!(first, second);
        assert_eq!(host.open_pages(), [PageId::new(2)]);
        assert!(host.calls().contains(&HostCall::Close(PageId::new(1))));
        assert!(
            host.calls()
                .contains(&HostCall::Trigger(PageId::new(2), "Initialize dev workers".to_string()))
        );

        manager
            .call_client("getPeers", Vec::new())
            .await
            .expect("call");
        let evaluated: Vec<_> = host
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Evaluate { page, .. } => Some(page),
                _ => None,
            })
            .collect();
        assert_eq!(evaluated, [PageId::new(2)]);
    }

    #[tokio::test]
    async fn test_failed_initialization_requires_replace() {
        let (manager, host) = manager();
        host.fail_trigger(true);

        let err = manager.initialize(NetworkMode::Standard).await.unwrap_err();
        assert!(err.is_session_error());
        assert_eq!(manager.state(), SessionState::Failed);
        assert!(host.open_pages().is_empty());

        let err = manager.call_client("getTipHeader", Vec::new()).await.unwrap_err();
        assert!(matches!(err, Error::Session { .. }));

        let err = manager.initialize(NetworkMode::Standard).await.unwrap_err();
        assert!(matches!(err, Error::Session { .. }));

        host.fail_trigger(false);
        manager
            .replace(NetworkMode::Standard)
            .await
            .expect("replace");
        assert_eq!(manager.state(), SessionState::Ready);
        assert_eq!(host.open_pages().len(), 1);
    }

    #[tokio::test]
    async fn test_stop_forwards_and_keeps_page() {
        let (manager, host) = manager();
        manager
            .initialize(NetworkMode::Standard)
            .await
            .expect("initialize");

        manager.stop().await.expect("stop");
        assert_eq!(manager.state(), SessionState::Stopped);
        assert_eq!(host.last_args("stop"), Some(json!([])));

        host.reject("getTipHeader", "client is stopped");
        let err = manager.call_client("getTipHeader", Vec::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "client is stopped");
    }

    #[tokio::test]
    async fn test_start_uses_current_mode() {
        let (manager, host) = manager();
        manager
            .initialize(NetworkMode::Development)
            .await
            .expect("initialize");
        manager.stop().await.expect("stop");

        manager.start().await.expect("start");
        assert_eq!(manager.state(), SessionState::Ready);

        let triggers = host
            .calls()
            .into_iter()
            .filter(|call| matches!(call, HostCall::Trigger(_, name) if name == "Initialize dev workers"))
            .count();
        assert_eq!(triggers, 2);
    }

    #[tokio::test]
    async fn test_call_during_replace_waits_for_new_page() {
        let (manager, host) = manager_with(Duration::from_millis(100));
        manager
            .initialize(NetworkMode::Standard)
            .await
            .expect("initialize");

        let replacing = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.replace(NetworkMode::Standard).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_ne!(manager.state(), SessionState::Ready);

        let calling = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.call_client("getTipHeader", Vec::new()).await })
        };

        replacing.await.expect("join").expect("replace");
        calling.await.expect("join").expect("call");

        let last = host.calls().pop().expect("calls");
        assert!(matches!(last, HostCall::Evaluate { page, .. } if page == PageId::new(2)));
    }

    #[tokio::test]
    async fn test_replace_not_blocked_by_hung_call() {
        let (manager, host) = manager();
        manager
            .initialize(NetworkMode::Standard)
            .await
            .expect("initialize");
        host.delay_method("getTipHeader", Duration::from_secs(3600));

        let hung = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.call_client("getTipHeader", Vec::new()).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!hung.is_finished());

        tokio::time::timeout(Duration::from_secs(2), manager.replace(NetworkMode::Standard))
            .await
            .expect("replace waited on the hung call")
            .expect("replace");
        assert_eq!(host.open_pages(), [PageId::new(2)]);

        manager
            .call_client("getPeers", Vec::new())
            .await
            .expect("call on new page");
        hung.abort();
    }

    #[tokio::test]
    async fn test_stop_not_blocked_by_pending_call() {
        let (manager, host) = manager();
        manager
            .initialize(NetworkMode::Standard)
            .await
            .expect("initialize");
        host.delay_method("getCells", Duration::from_secs(3600));

        let pending = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.call_client("getCells", Vec::new()).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(Duration::from_secs(2), manager.stop())
            .await
            .expect("stop waited on the pending call")
            .expect("stop");
        assert_eq!(manager.state(), SessionState::Stopped);
        pending.abort();
    }

    #[tokio::test]
    async fn test_call_on_replaced_page_fails() {
        let (manager, host) = manager();
        manager
            .initialize(NetworkMode::Standard)
            .await
            .expect("initialize");
        host.delay_method("getTipHeader", Duration::from_millis(200));

        let pending = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.call_client("getTipHeader", Vec::new()).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        manager
            .replace(NetworkMode::Standard)
            .await
            .expect("replace");

        let err = pending.await.expect("join").unwrap_err();
        assert!(err.to_string().contains("no such page"), "{err}");
        assert_eq!(manager.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_stop_racing_replace_keeps_new_state() {
        let (manager, host) = manager();
        manager
            .initialize(NetworkMode::Standard)
            .await
            .expect("initialize");
        host.delay_method("stop", Duration::from_millis(200));

        let stopping = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.stop().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        manager
            .replace(NetworkMode::Development)
            .await
            .expect("replace");

        assert!(stopping.await.expect("join").is_err());
        assert_eq!(manager.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_shutdown_closes_page() {
        let (manager, host) = manager();
        manager
            .initialize(NetworkMode::Standard)
            .await
            .expect("initialize");

        manager.shutdown().await.expect("shutdown");
        assert!(host.open_pages().is_empty());
        assert_eq!(manager.state(), SessionState::Uninitialized);
        assert_eq!(manager.session_id().await, None);
    }
}
