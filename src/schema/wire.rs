//! JSON-RPC wire records.
//!
//! Field names are snake_case and every integer or byte string is carried as
//! `0x`-prefixed lowercase hex in a [`Hex`] value. Records here are shapes
//! only. Hex validation happens when they are converted to domain records,
//! so decode errors can name the offending field.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Hex
// ============================================================================

/// A `0x`-prefixed hex string as it appears on the wire.
///
/// Holds integers (`0x1f`), byte strings (`0xdead`) and hashes alike. The
/// content is not validated until conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hex(String);

impl Hex {
    /// Wraps a hex string without validating it.
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the raw text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Hex {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for Hex {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Enumerations
// ============================================================================

string_enum! {
    /// Script hash type.
    pub enum HashType in "hash_type" {
        Data => "data",
        Type => "type",
        Data1 => "data1",
        Data2 => "data2",
    }
}

string_enum! {
    /// Cell dependency type.
    pub enum DepType in "dep_type" {
        Code => "code",
        DepGroup => "dep_group",
    }
}

string_enum! {
    /// Which script of a cell a search key matches.
    pub enum ScriptType in "script_type" {
        Lock => "lock",
        Type => "type",
    }
}

string_enum! {
    /// How a search key script is matched.
    pub enum ScriptSearchMode in "script_search_mode" {
        Prefix => "prefix",
        Exact => "exact",
        Partial => "partial",
    }
}

string_enum! {
    /// How a filter's output data is matched.
    pub enum OutputDataFilterMode in "output_data_filter_mode" {
        Prefix => "prefix",
        Exact => "exact",
        Partial => "partial",
    }
}

string_enum! {
    /// Transaction pool or chain status.
    pub enum Status in "status" {
        Pending => "pending",
        Proposed => "proposed",
        Committed => "committed",
        Unknown => "unknown",
        Rejected => "rejected",
    }
}

string_enum! {
    /// Whether a cell appears as a transaction input or output.
    pub enum IoType in "io_type" {
        Input => "input",
        Output => "output",
    }
}

string_enum! {
    /// Result ordering for paginated searches.
    pub enum Order in "order" {
        Asc => "asc",
        Desc => "desc",
    }
}

string_enum! {
    /// How `set_scripts` combines the given scripts with the registered ones.
    pub enum SetScriptsCommand in "command" {
        All => "all",
        Partial => "partial",
        Delete => "delete",
    }
}

// ============================================================================
// Chain Records
// ============================================================================

/// A lock or type script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub code_hash: Hex,
    pub hash_type: HashType,
    pub args: Hex,
}

/// Reference to a transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutPoint {
    pub tx_hash: Hex,
    pub index: Hex,
}

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellInput {
    pub previous_output: OutPoint,
    pub since: Hex,
}

/// A transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellOutput {
    pub capacity: Hex,
    pub lock: Script,
    /// Serialized as `null` when absent.
    #[serde(rename = "type", default)]
    pub type_: Option<Script>,
}

/// A cell dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellDep {
    pub out_point: OutPoint,
    pub dep_type: DepType,
}

/// A transaction.
///
/// `hash` is ignored on input and always recomputed on output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: Hex,
    pub cell_deps: Vec<CellDep>,
    pub header_deps: Vec<Hex>,
    pub inputs: Vec<CellInput>,
    pub outputs: Vec<CellOutput>,
    pub outputs_data: Vec<Hex>,
    pub witnesses: Vec<Hex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<Hex>,
}

/// A block header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub compact_target: Hex,
    /// 32 bytes: `c`, `ar`, `s`, `u` as little-endian u64s.
    pub dao: Hex,
    /// Packed `number | index << 24 | length << 40`.
    pub epoch: Hex,
    pub extra_hash: Hex,
    pub hash: Hex,
    pub nonce: Hex,
    pub number: Hex,
    pub parent_hash: Hex,
    pub proposals_hash: Hex,
    pub timestamp: Hex,
    pub transactions_root: Hex,
    pub version: Hex,
}

/// An uncle block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncleBlock {
    pub header: Header,
    pub proposals: Vec<Hex>,
}

/// A block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub proposals: Vec<Hex>,
    pub transactions: Vec<Transaction>,
    pub uncles: Vec<UncleBlock>,
}

// ============================================================================
// Transaction Status
// ============================================================================

/// Status part of a [`TransactionWithStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxStatus {
    pub status: Status,
    /// Serialized as `null` when absent.
    #[serde(default)]
    pub block_hash: Option<Hex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<Hex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_index: Option<Hex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Result of `get_transaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionWithStatus {
    #[serde(default)]
    pub transaction: Option<Transaction>,
    #[serde(default)]
    pub cycles: Option<Hex>,
    pub tx_status: TxStatus,
}

impl TransactionWithStatus {
    /// The record returned when no transaction is known.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            transaction: None,
            cycles: None,
            tx_status: TxStatus {
                status: Status::Unknown,
                block_hash: None,
                block_number: None,
                tx_index: None,
                reason: None,
            },
        }
    }
}

/// Result of `fetch_header` and `fetch_transaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchResponse<T> {
    Fetched { data: T },
    Fetching { first_sent: Hex },
    Added { timestamp: Hex },
    NotFound,
}

// ============================================================================
// Scripts Registry
// ============================================================================

/// A script registered with the light client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStatus {
    pub script: Script,
    pub script_type: ScriptType,
    pub block_number: Hex,
}

// ============================================================================
// Indexer
// ============================================================================

/// Optional narrowing of a [`SearchKey`].
///
/// Ranges are half-open `[start, end)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchKeyFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<Script>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_len_range: Option<[Hex; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data: Option<Hex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data_filter_mode: Option<OutputDataFilterMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data_len_range: Option<[Hex; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_capacity_range: Option<[Hex; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_range: Option<[Hex; 2]>,
}

/// Search key for `get_cells`, `get_transactions` and `get_cells_capacity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchKey {
    pub script: Script,
    pub script_type: ScriptType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_search_mode: Option<ScriptSearchMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<SearchKeyFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_data: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by_transaction: Option<bool>,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination<T> {
    pub objects: Vec<T>,
    pub last_cursor: String,
}

/// A live cell found by `get_cells`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub out_point: OutPoint,
    pub output: CellOutput,
    /// Omitted when the search key set `with_data: false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data: Option<Hex>,
    pub block_number: Hex,
    pub tx_index: Hex,
}

/// One transaction per matching cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxWithCell {
    pub transaction: Transaction,
    pub block_number: Hex,
    pub tx_index: Hex,
    pub io_index: Hex,
    pub io_type: IoType,
}

/// One transaction with all of its matching cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxWithCells {
    pub transaction: Transaction,
    pub block_number: Hex,
    pub tx_index: Hex,
    pub cells: Vec<(IoType, Hex)>,
}

/// Result of `get_transactions`.
///
/// The variant follows the request's `group_by_transaction` flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TransactionsPage {
    Ungrouped(Pagination<TxWithCell>),
    Grouped(Pagination<TxWithCells>),
}

/// Result of `get_cells_capacity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellsCapacity {
    pub block_hash: Hex,
    pub block_number: Hex,
    pub capacity: Hex,
}

// ============================================================================
// Network
// ============================================================================

/// A known address of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAddress {
    pub address: String,
    pub score: Hex,
}

/// A protocol opened with a remote node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNodeProtocol {
    pub id: Hex,
    pub version: String,
}

/// Best known headers claimed by a peer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSyncState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_best_known_header: Option<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proved_best_known_header: Option<Header>,
}

/// A connected peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNode {
    pub version: String,
    pub node_id: String,
    pub addresses: Vec<NodeAddress>,
    pub connected_duration: Hex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_state: Option<PeerSyncState>,
    pub protocols: Vec<RemoteNodeProtocol>,
}

/// A protocol supported by the local node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalNodeProtocol {
    pub id: Hex,
    pub name: String,
    #[serde(alias = "support_version")]
    pub support_versions: Vec<String>,
}

/// Result of `local_node_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalNode {
    pub version: String,
    pub node_id: String,
    pub active: bool,
    pub addresses: Vec<NodeAddress>,
    pub protocols: Vec<LocalNodeProtocol>,
    pub connections: Hex,
}

// ============================================================================
// Tests
// ============================================================================
