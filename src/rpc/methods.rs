//! Light client methods.
//!
//! Every handler decodes its wire parameters, forwards the call to the
//! client page through the [`SessionManager`] and encodes the domain result
//! back to wire form.
//!
//! | Method | Client call | Not found |
//! |--------|-------------|-----------|
//! | `set_scripts` | `setScripts(scripts, command?)` | - |
//! | `get_scripts` | `getScripts()` | - |
//! | `send_transaction` | `sendTransaction(tx)` | - |
//! | `estimate_cycles` | `estimateCycles(tx)` | - |
//! | `get_tip_header` | `getTipHeader()` | - |
//! | `get_genesis_block` | `getGenesisBlock()` | - |
//! | `get_header` | `getHeader(hash)` | `null` |
//! | `get_transaction` | `getTransaction(hash)` | status `unknown` |
//! | `fetch_header` | `fetchHeader(hash)` | `not_found` |
//! | `fetch_transaction` | `fetchTransaction(hash)` | `not_found` |
//! | `get_peers` | `getPeers()` | - |
//! | `local_node_info` | `localNodeInfo()` | - |
//! | `get_cells` | `getCells(key, order, limit, cursor)` | empty page |
//! | `get_transactions` | `getTransactions(key, order, limit, cursor)` | empty page |
//! | `get_cells_capacity` | capacity script | - |
//! | `stop` / `start` | session lifecycle | - |
//! | `new_client` / `new_dev_client` | session replacement | - |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::async_handler;
use crate::error::{DecodeResultExt, Error};
use crate::host::NetworkMode;
use crate::host::script::{CELLS_CAPACITY, cells_capacity};
use crate::schema::primitives::{JsInt, undefined};
use crate::schema::wire::{self, Hex};
use crate::schema::{H256, domain};
use crate::session::SessionManager;
use crate::transform::hex::{decode_h256, decode_uint, encode_h256, encode_uint};
use crate::transform::{
    cells_page_to_wire, fetch_response_to_wire, map_into, transaction_response_to_wire, try_map,
};

use super::error::RpcError;
use super::handler::RpcHandler;
use super::params::Params;

/// Handler data shared by every method.
pub type Session = Arc<SessionManager>;

// ============================================================================
// Registration
// ============================================================================

/// Registers every light client method on `handler`.
pub fn register_methods(handler: &mut RpcHandler<Session>) {
    handler.register_method("set_scripts", async_handler!(set_scripts));
    handler.register_method("get_scripts", async_handler!(get_scripts));
    handler.register_method("send_transaction", async_handler!(send_transaction));
    handler.register_method("estimate_cycles", async_handler!(estimate_cycles));
    handler.register_method("get_tip_header", async_handler!(get_tip_header));
    handler.register_method("get_genesis_block", async_handler!(get_genesis_block));
    handler.register_method("get_header", async_handler!(get_header));
    handler.register_method("get_transaction", async_handler!(get_transaction));
    handler.register_method("fetch_header", async_handler!(fetch_header));
    handler.register_method("fetch_transaction", async_handler!(fetch_transaction));
    handler.register_method("get_peers", async_handler!(get_peers));
    handler.register_method("local_node_info", async_handler!(local_node_info));
    handler.register_method("get_cells", async_handler!(get_cells));
    handler.register_method("get_transactions", async_handler!(get_transactions));
    handler.register_method("get_cells_capacity", async_handler!(get_cells_capacity));
    handler.register_method("stop", async_handler!(stop));
    handler.register_method("start", async_handler!(start));
    handler.register_method("new_client", async_handler!(new_client));
    handler.register_method("new_dev_client", async_handler!(new_dev_client));
}

// ============================================================================
// Helpers
// ============================================================================

/// Encodes a domain value as a client argument.
fn to_page<T: Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::from(Error::from(e)))
}

/// Decodes what the client returned for `method`.
fn from_page<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, RpcError> {
    serde_json::from_value(value)
        .map_err(|e| RpcError::internal(format!("unexpected {method} result: {e}")))
}

/// Encodes a wire result.
fn to_wire<T: Serialize>(value: T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::internal(e.to_string()))
}

/// Calls `method` on the client and decodes its result.
async fn query<T: DeserializeOwned>(
    session: &SessionManager,
    method: &str,
    args: Vec<Value>,
) -> Result<T, RpcError> {
    let value = session.call_client(method, args).await?;
    from_page(method, value)
}

/// Reads a hash parameter.
fn hash_param(params: &Params, index: usize, name: &str) -> Result<H256, RpcError> {
    let hex: Hex = params.required(index, name)?;
    Ok(decode_h256(&hex).within(name)?)
}

/// Reads a transaction parameter.
fn transaction_param(params: &Params) -> Result<domain::Transaction, RpcError> {
    let tx: wire::Transaction = params.required(0, "transaction")?;
    Ok(domain::Transaction::try_from(tx).within("transaction")?)
}

/// Page size as a hex string or a plain number.
#[derive(Deserialize)]
#[serde(untagged)]
enum Limit {
    Number(u64),
    Hex(Hex),
}

impl Limit {
    fn value(&self) -> Result<u64, Error> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Hex(hex) => decode_uint(hex).within("limit"),
        }
    }
}

/// Decoded parameters of a paginated search.
struct Search {
    /// Search key as sent by the caller, for its flags.
    key: wire::SearchKey,
    /// Positional client arguments: key, order, limit, cursor.
    args: Vec<Value>,
}

impl Search {
    /// Reads `(search_key, order?, limit?, cursor?)`.
    ///
    /// Absent optional parameters are passed to the client as `undefined`.
    fn parse(body: Value) -> Result<Self, RpcError> {
        let params = Params::at_most(body, 4)?;

        let key: wire::SearchKey = params.required(0, "search_key")?;
        let domain_key = domain::SearchKey::try_from(key.clone()).within("search_key")?;

        let order = match params.optional::<wire::Order>(1, "order")? {
            Some(order) => to_page(&domain::Order::from(order))?,
            None => undefined(),
        };
        let limit = match params.optional::<Limit>(2, "limit")? {
            Some(limit) => to_page(&JsInt(limit.value()?))?,
            None => undefined(),
        };
        let cursor = match params.optional::<String>(3, "cursor")? {
            Some(cursor) => Value::String(cursor),
            None => undefined(),
        };

        Ok(Self {
            key,
            args: vec![to_page(&domain_key)?, order, limit, cursor],
        })
    }
}

// ============================================================================
// Scripts
// ============================================================================

async fn set_scripts(session: Session, body: Value) -> Result<Value, RpcError> {
    let params = Params::at_most(body, 2)?;

    let scripts: Vec<wire::ScriptStatus> = params.required(0, "scripts")?;
    let scripts = try_map(scripts, domain::ScriptStatus::try_from).within("scripts")?;

    let mut args = vec![to_page(&scripts)?];
    if let Some(command) = params.optional::<wire::SetScriptsCommand>(1, "command")? {
        args.push(to_page(&domain::SetScriptsCommand::from(command))?);
    }

    session.call_client("setScripts", args).await?;
    Ok(Value::Null)
}

async fn get_scripts(session: Session, body: Value) -> Result<Value, RpcError> {
    Params::at_most(body, 0)?;
    let scripts: Vec<domain::ScriptStatus> = query(&session, "getScripts", Vec::new()).await?;
    to_wire(map_into::<_, wire::ScriptStatus>(scripts))
}

// ============================================================================
// Transactions
// ============================================================================

async fn send_transaction(session: Session, body: Value) -> Result<Value, RpcError> {
    let params = Params::at_most(body, 1)?;
    let tx = transaction_param(&params)?;

    let hash: H256 = query(&session, "sendTransaction", vec![to_page(&tx)?]).await?;
    to_wire(encode_h256(&hash))
}

async fn estimate_cycles(session: Session, body: Value) -> Result<Value, RpcError> {
    let params = Params::at_most(body, 1)?;
    let tx = transaction_param(&params)?;

    let JsInt(cycles): JsInt<u64> = query(&session, "estimateCycles", vec![to_page(&tx)?]).await?;
    to_wire(encode_uint(cycles))
}

async fn get_transaction(session: Session, body: Value) -> Result<Value, RpcError> {
    let params = Params::at_most(body, 1)?;
    let hash = hash_param(&params, 0, "tx_hash")?;

    let response: Option<domain::TransactionResponse> =
        query(&session, "getTransaction", vec![to_page(&hash)?]).await?;
    to_wire(transaction_response_to_wire(response))
}

async fn fetch_transaction(session: Session, body: Value) -> Result<Value, RpcError> {
    let params = Params::at_most(body, 1)?;
    let hash = hash_param(&params, 0, "tx_hash")?;

    let response: domain::FetchResponse<domain::TransactionResponse> =
        query(&session, "fetchTransaction", vec![to_page(&hash)?]).await?;
    to_wire(fetch_response_to_wire(response, |data| {
        transaction_response_to_wire(Some(data))
    }))
}

// ============================================================================
// Chain
// ============================================================================

async fn get_tip_header(session: Session, body: Value) -> Result<Value, RpcError> {
    Params::at_most(body, 0)?;
    let header: domain::Header = query(&session, "getTipHeader", Vec::new()).await?;
    to_wire(wire::Header::from(header))
}

async fn get_genesis_block(session: Session, body: Value) -> Result<Value, RpcError> {
    Params::at_most(body, 0)?;
    let block: domain::Block = query(&session, "getGenesisBlock", Vec::new()).await?;
    to_wire(wire::Block::from(block))
}

async fn get_header(session: Session, body: Value) -> Result<Value, RpcError> {
    let params = Params::at_most(body, 1)?;
    let hash = hash_param(&params, 0, "block_hash")?;

    let header: Option<domain::Header> =
        query(&session, "getHeader", vec![to_page(&hash)?]).await?;
    to_wire(header.map(|header: domain::Header| wire::Header::from(header)))
}

async fn fetch_header(session: Session, body: Value) -> Result<Value, RpcError> {
    let params = Params::at_most(body, 1)?;
    let hash = hash_param(&params, 0, "header_hash")?;

    let response: domain::FetchResponse<domain::Header> =
        query(&session, "fetchHeader", vec![to_page(&hash)?]).await?;
    to_wire(fetch_response_to_wire(response, |header: domain::Header| {
        wire::Header::from(header)
    }))
}

// ============================================================================
// Network
// ============================================================================

async fn get_peers(session: Session, body: Value) -> Result<Value, RpcError> {
    Params::at_most(body, 0)?;
    let peers: Vec<domain::RemoteNode> = query(&session, "getPeers", Vec::new()).await?;
    to_wire(map_into::<_, wire::RemoteNode>(peers))
}

async fn local_node_info(session: Session, body: Value) -> Result<Value, RpcError> {
    Params::at_most(body, 0)?;
    let node: domain::LocalNode = query(&session, "localNodeInfo", Vec::new()).await?;
    to_wire(wire::LocalNode::from(node))
}

// ============================================================================
// Indexer
// ============================================================================

async fn get_cells(session: Session, body: Value) -> Result<Value, RpcError> {
    let search = Search::parse(body)?;

    let page: domain::CellsPage = query(&session, "getCells", search.args).await?;
    to_wire(cells_page_to_wire(page, search.key.with_data))
}

async fn get_transactions(session: Session, body: Value) -> Result<Value, RpcError> {
    let search = Search::parse(body)?;

    let page = if search.key.group_by_transaction == Some(true) {
        let page: domain::TransactionsPage<domain::TxWithCells> =
            query(&session, "getTransactions", search.args).await?;
        wire::TransactionsPage::from(page)
    } else {
        let page: domain::TransactionsPage<domain::TxWithCell> =
            query(&session, "getTransactions", search.args).await?;
        wire::TransactionsPage::from(page)
    };
    to_wire(page)
}

async fn get_cells_capacity(session: Session, body: Value) -> Result<Value, RpcError> {
    let params = Params::at_most(body, 1)?;
    let key: wire::SearchKey = params.required(0, "search_key")?;
    let key = domain::SearchKey::try_from(key).within("search_key")?;

    let value = session
        .call(CELLS_CAPACITY, cells_capacity(to_page(&key)?))
        .await?;
    let capacity: domain::CellsCapacity = from_page("getCellsCapacity", value)?;
    to_wire(wire::CellsCapacity::from(capacity))
}

// ============================================================================
// Lifecycle
// ============================================================================

async fn stop(session: Session, body: Value) -> Result<Value, RpcError> {
    Params::at_most(body, 0)?;
    session.stop().await?;
    Ok(Value::Null)
}

async fn start(session: Session, body: Value) -> Result<Value, RpcError> {
    Params::at_most(body, 0)?;
    session.start().await?;
    Ok(Value::Null)
}

async fn new_client(session: Session, body: Value) -> Result<Value, RpcError> {
    Params::at_most(body, 0)?;
    session.replace(NetworkMode::Standard).await?;
    Ok(Value::Null)
}

async fn new_dev_client(session: Session, body: Value) -> Result<Value, RpcError> {
    Params::at_most(body, 0)?;
    session.replace(NetworkMode::Development).await?;
    Ok(Value::Null)
}

// ============================================================================
// Tests
// ============================================================================
