//! Command line and environment configuration.
//!
//! Every option except `--browser-arg` can also be given through the
//! environment variable shown in `--help`.

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::host::{DEFAULT_EVALUATE_TIMEOUT, HostBuilder, NetworkMode};
use crate::rpc::DEFAULT_BODY_LIMIT;
use crate::session::{
    DEFAULT_CLIENT_URL, DEFAULT_DEV_CONTROL, DEFAULT_STANDARD_CONTROL, SessionConfig,
};

// ============================================================================
// Constants
// ============================================================================

/// Default JSON-RPC listen address.
pub const DEFAULT_LISTEN_ADDRESS: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 9000);

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ============================================================================
// Config
// ============================================================================

/// JSON-RPC bridge for a browser-hosted CKB light client.
#[derive(Debug, Clone, Parser)]
#[command(name = "ckb-light-client-rpc", version, about)]
pub struct Config {
    /// JSON-RPC listen address
    #[arg(long, env = "CKB_RPC_LISTEN", default_value_t = DEFAULT_LISTEN_ADDRESS)]
    pub listen: SocketAddr,

    /// URL of the page hosting the light client
    #[arg(long, env = "CKB_CLIENT_URL", default_value = DEFAULT_CLIENT_URL, value_parser = absolute_url)]
    pub client_url: String,

    /// Network to join on startup: standard or development
    #[arg(long, env = "CKB_NETWORK_MODE", default_value_t = NetworkMode::Standard)]
    pub mode: NetworkMode,

    /// Address the browser agent connects to
    #[arg(long, env = "CKB_AGENT_IP", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub agent_ip: IpAddr,

    /// Port the browser agent connects to (0 picks a free port)
    #[arg(long, env = "CKB_AGENT_PORT", default_value_t = 0)]
    pub agent_port: u16,

    /// Browser to launch; without it an externally started agent is awaited
    #[arg(long, env = "CKB_BROWSER")]
    pub browser: Option<PathBuf>,

    /// Extra browser argument, repeatable; `{agent_url}` and `{profile}` are substituted
    #[arg(long = "browser-arg", allow_hyphen_values = true)]
    pub browser_args: Vec<String>,

    /// Seconds to wait for the browser agent to connect
    #[arg(long, env = "CKB_CONNECT_TIMEOUT", default_value_t = 30)]
    pub connect_timeout_secs: u64,

    /// Seconds to wait for an in-page call; 0 waits indefinitely
    #[arg(long, env = "CKB_EVALUATE_TIMEOUT", default_value_t = DEFAULT_EVALUATE_TIMEOUT.as_secs())]
    pub evaluate_timeout_secs: u64,

    /// Largest accepted JSON-RPC request body, in bytes
    #[arg(long, env = "CKB_MAX_BODY_BYTES", default_value_t = DEFAULT_BODY_LIMIT)]
    pub max_body_bytes: usize,

    /// Milliseconds to wait after clicking an initialization control
    #[arg(long, env = "CKB_SETTLE_DELAY_MS", default_value_t = 1000)]
    pub settle_delay_ms: u64,

    /// Label of the control starting a standard client
    #[arg(long, env = "CKB_STANDARD_CONTROL", default_value = DEFAULT_STANDARD_CONTROL)]
    pub standard_control: String,

    /// Label of the control starting a development client
    #[arg(long, env = "CKB_DEV_CONTROL", default_value = DEFAULT_DEV_CONTROL)]
    pub dev_control: String,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, env = "CKB_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,
}

/// Accepts absolute URLs only, keeping the text as given.
fn absolute_url(text: &str) -> Result<String, url::ParseError> {
    Url::parse(text)?;
    Ok(text.to_string())
}

impl Config {
    /// Host builder for the agent link and optional browser.
    #[must_use]
    pub fn host_builder(&self) -> HostBuilder {
        let builder = HostBuilder::new()
            .ip(self.agent_ip)
            .port(self.agent_port)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .evaluate_timeout(self.evaluate_timeout());

        match &self.browser {
            Some(binary) => builder.browser(binary, self.browser_args.clone()),
            None => builder,
        }
    }

    /// Bound on in-page calls; `None` when disabled with 0.
    #[must_use]
    pub fn evaluate_timeout(&self) -> Option<Duration> {
        (self.evaluate_timeout_secs > 0).then(|| Duration::from_secs(self.evaluate_timeout_secs))
    }

    /// Session settings.
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            client_url: self.client_url.clone(),
            standard_control: self.standard_control.clone(),
            dev_control: self.dev_control.clone(),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
