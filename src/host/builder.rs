//! Builder pattern for host configuration.
//!
//! Provides a fluent API for configuring and creating [`BrowserHost`]
//! instances.
//!
//! # Example
//!
//! ```ignore
//! use ckb_light_client_rpc::host::HostBuilder;
//!
//! let host = HostBuilder::new()
//!     .port(9100)
//!     .browser("/usr/bin/chromium", vec!["--headless=new".into()])
//!     .build()
//!     .await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::error::{Error, Result};
use crate::transport::{CONNECTION_TIMEOUT, PendingServer};

use super::browser::{BrowserHost, DEFAULT_EVALUATE_TIMEOUT};
use super::launcher::Launcher;

// ============================================================================
// HostBuilder
// ============================================================================

/// Builder for configuring a [`BrowserHost`].
#[derive(Debug, Clone)]
pub struct HostBuilder {
    /// Address the agent server binds to.
    ip: IpAddr,
    /// Port the agent server binds to.
    port: u16,
    /// Browser to launch, if any.
    launcher: Option<Launcher>,
    /// How long to wait for the agent to connect.
    connect_timeout: Duration,
    /// Timeout for in-page evaluation.
    evaluate_timeout: Option<Duration>,
}

impl Default for HostBuilder {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            launcher: None,
            connect_timeout: CONNECTION_TIMEOUT,
            evaluate_timeout: Some(DEFAULT_EVALUATE_TIMEOUT),
        }
    }
}

// ============================================================================
// HostBuilder Implementation
// ============================================================================

impl HostBuilder {
    /// Creates a builder with defaults: localhost, random port, no browser.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the address the agent server binds to.
    #[inline]
    #[must_use]
    pub fn ip(mut self, ip: IpAddr) -> Self {
        self.ip = ip;
        self
    }

    /// Sets the port the agent server binds to (0 for random).
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Launches `binary` with `args` once the agent server is bound.
    ///
    /// Without a browser the host waits for an externally started agent.
    #[inline]
    #[must_use]
    pub fn browser(mut self, binary: impl Into<PathBuf>, args: Vec<String>) -> Self {
        self.launcher = Some(Launcher::new(binary, args));
        self
    }

    /// Sets how long to wait for the agent to connect.
    #[inline]
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Bounds every in-page evaluation; `None` waits until the agent answers.
    ///
    /// Defaults to [`DEFAULT_EVALUATE_TIMEOUT`].
    #[inline]
    #[must_use]
    pub fn evaluate_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.evaluate_timeout = timeout;
        self
    }

    /// Binds the agent server, optionally launches the browser, and waits for
    /// the agent's READY handshake.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if a timeout is zero
    /// - [`Error::BrowserNotFound`] if the browser binary doesn't exist
    /// - [`Error::ProcessLaunchFailed`] if the browser fails to start
    /// - [`Error::ConnectionTimeout`] if the agent doesn't connect in time
    pub async fn build(self) -> Result<BrowserHost> {
        self.validate()?;

        let server = PendingServer::bind(self.ip, self.port)
            .await?
            .with_accept_timeout(self.connect_timeout);
        let agent_url = server.ws_url();
        info!(url = %agent_url, "Waiting for browser agent");

        let browser = self
            .launcher
            .as_ref()
            .map(|launcher| launcher.spawn(&agent_url))
            .transpose()?;

        let (connection, ready) = server.accept().await?;
        info!(agent_session = ready.session_id, "Browser agent ready");

        Ok(BrowserHost::new(connection, browser, self.evaluate_timeout))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl HostBuilder {
    /// Validates the configuration.
    fn validate(&self) -> Result<()> {
        if let Some(launcher) = &self.launcher
            && !launcher.binary().exists()
        {
            return Err(Error::browser_not_found(launcher.binary()));
        }

        if self.connect_timeout.is_zero() {
            return Err(Error::config("Agent connect timeout must be greater than zero"));
        }

        if self.evaluate_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::config(
                "Evaluate timeout must be greater than zero; omit it to wait indefinitely",
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
