//! `ckb-light-client-rpc` binary.
//!
//! Connects to the browser agent, starts the light client page and serves
//! JSON-RPC until interrupted.

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ckb_light_client_rpc::host::ExecutionHost;
use ckb_light_client_rpc::rpc::{RpcHandler, register_methods, serve};
use ckb_light_client_rpc::{Config, Result, SessionManager};

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(&config.log_level);

    let host: Arc<dyn ExecutionHost> = Arc::new(config.host_builder().build().await?);
    let session = Arc::new(SessionManager::new(host, config.session_config()));

    // A failed start leaves the session replaceable through new_client.
    match session.initialize(config.mode).await {
        Ok(session_id) => info!(%session_id, mode = %config.mode, "Light client started"),
        Err(e) => error!(error = %e, "Light client failed to start"),
    }

    let mut handler = RpcHandler::new(Arc::clone(&session));
    register_methods(&mut handler);

    let served = match serve(config.listen, Arc::new(handler), config.max_body_bytes) {
        Ok(server) => server.await,
        Err(e) => Err(e),
    };

    if let Err(e) = session.shutdown().await {
        warn!(error = %e, "Shutdown incomplete");
    }
    info!("Bye");

    served.map_err(Into::into)
}
