//! In-page client records.
//!
//! Field names are camelCase. Integers are native exact-width types that cross
//! into the page as tagged big integers (see [`bigint`]); byte strings are
//! [`Bytes`] and hashes are [`H256`].

// ============================================================================
// Imports
// ============================================================================

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::primitives::{Bytes, H256, JsInt, bigint};

// ============================================================================
// Enumerations
// ============================================================================

string_enum! {
    /// Script hash type.
    pub enum HashType in "hashType" {
        Data => "data",
        Type => "type",
        Data1 => "data1",
        Data2 => "data2",
    }
}

string_enum! {
    /// Cell dependency type.
    pub enum DepType in "depType" {
        Code => "code",
        DepGroup => "depGroup",
    }
}

string_enum! {
    /// Which script of a cell a search key matches.
    pub enum ScriptType in "scriptType" {
        Lock => "lock",
        Type => "type",
    }
}

string_enum! {
    /// How a search key script is matched.
    pub enum ScriptSearchMode in "scriptSearchMode" {
        Prefix => "prefix",
        Exact => "exact",
        Partial => "partial",
    }
}

string_enum! {
    /// How a filter's output data is matched.
    pub enum OutputDataSearchMode in "outputDataSearchMode" {
        Prefix => "prefix",
        Exact => "exact",
        Partial => "partial",
    }
}

string_enum! {
    /// Transaction pool or chain status.
    pub enum TransactionStatus in "status" {
        Pending => "pending",
        Proposed => "proposed",
        Committed => "committed",
        Unknown => "unknown",
        Rejected => "rejected",
    }
}

string_enum! {
    /// Whether a cell appears as a transaction input or output.
    pub enum IoType in "ioType" {
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

/// Mode argument of `client.setScripts`.
///
/// The client takes the numeric discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SetScriptsCommand {
    /// Replace every registered script.
    All = 0,
    /// Add or update the given scripts.
    Partial = 1,
    /// Remove the given scripts.
    Delete = 2,
}

impl SetScriptsCommand {
    /// Every variant, in discriminant order.
    pub const ALL: &'static [Self] = &[Self::All, Self::Partial, Self::Delete];
}

impl Serialize for SetScriptsCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for SetScriptsCommand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(Self::All),
            1 => Ok(Self::Partial),
            2 => Ok(Self::Delete),
            other => Err(D::Error::custom(format!("unknown command {other}"))),
        }
    }
}

// ============================================================================
// Chain Records
// ============================================================================

/// A lock or type script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub code_hash: H256,
    pub hash_type: HashType,
    pub args: Bytes,
}

/// Reference to a transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutPoint {
    pub tx_hash: H256,
    #[serde(with = "bigint")]
    pub index: u32,
}

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellInput {
    pub previous_output: OutPoint,
    #[serde(with = "bigint")]
    pub since: u64,
}

/// A transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellOutput {
    #[serde(with = "bigint")]
    pub capacity: u64,
    pub lock: Script,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<Script>,
}

/// A cell dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellDep {
    pub out_point: OutPoint,
    pub dep_type: DepType,
}

/// A transaction.
///
/// Carries no hash; it is derived from the body when needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(with = "bigint")]
    pub version: u32,
    pub cell_deps: Vec<CellDep>,
    pub header_deps: Vec<H256>,
    pub inputs: Vec<CellInput>,
    pub outputs: Vec<CellOutput>,
    pub outputs_data: Vec<Bytes>,
    pub witnesses: Vec<Bytes>,
}

/// The four DAO accumulator fields of a header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dao {
    #[serde(with = "bigint")]
    pub c: u64,
    #[serde(with = "bigint")]
    pub ar: u64,
    #[serde(with = "bigint")]
    pub s: u64,
    #[serde(with = "bigint")]
    pub u: u64,
}

// ============================================================================
// Epoch
// ============================================================================

/// An epoch position: `index` blocks into epoch `number`, which is `length`
/// blocks long.
///
/// Serialized as the triple `[number, index, length]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Epoch {
    number: u32,
    index: u16,
    length: u16,
}

impl Epoch {
    /// Largest representable epoch number (24 bits).
    pub const MAX_NUMBER: u32 = (1 << 24) - 1;

    /// Creates an epoch position.
    ///
    /// Returns `None` if `number` does not fit in 24 bits.
    #[must_use]
    pub fn new(number: u32, index: u16, length: u16) -> Option<Self> {
        (number <= Self::MAX_NUMBER).then_some(Self {
            number,
            index,
            length,
        })
    }

    /// Returns the epoch number.
    #[inline]
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Returns the block index within the epoch.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> u16 {
        self.index
    }

    /// Returns the epoch length in blocks.
    #[inline]
    #[must_use]
    pub const fn length(&self) -> u16 {
        self.length
    }
}

impl Serialize for Epoch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (
            JsInt(self.number),
            JsInt(self.index),
            JsInt(self.length),
        )
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Epoch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (JsInt(number), JsInt(index), JsInt(length)) =
            <(JsInt<u32>, JsInt<u16>, JsInt<u16>)>::deserialize(deserializer)?;
        Self::new(number, index, length)
            .ok_or_else(|| D::Error::custom(format!("epoch number {number} exceeds 24 bits")))
    }
}

// ============================================================================
// Headers and Blocks
// ============================================================================

/// A block header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    #[serde(with = "bigint")]
    pub compact_target: u32,
    pub dao: Dao,
    pub epoch: Epoch,
    pub extra_hash: H256,
    pub hash: H256,
    #[serde(with = "bigint")]
    pub nonce: u128,
    #[serde(with = "bigint")]
    pub number: u64,
    pub parent_hash: H256,
    pub proposals_hash: H256,
    #[serde(with = "bigint")]
    pub timestamp: u64,
    pub transactions_root: H256,
    #[serde(with = "bigint")]
    pub version: u32,
}

/// An uncle block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncleBlock {
    pub header: Header,
    pub proposals: Vec<Bytes>,
}

/// A block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub proposals: Vec<Bytes>,
    pub transactions: Vec<Transaction>,
    pub uncles: Vec<UncleBlock>,
}

// ============================================================================
// Transaction Status
// ============================================================================

/// Result of `client.getTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub transaction: Transaction,
    pub status: TransactionStatus,
    #[serde(with = "bigint::option", default, skip_serializing_if = "Option::is_none")]
    pub cycles: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<H256>,
    #[serde(with = "bigint::option", default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(with = "bigint::option", default, skip_serializing_if = "Option::is_none")]
    pub tx_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Result of `client.fetchHeader` and `client.fetchTransaction`.
///
/// The client spells these fields in snake_case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchResponse<T> {
    /// The data is available locally.
    Fetched { data: T },
    /// A fetch was requested from peers at `first_sent`.
    Fetching {
        #[serde(with = "bigint")]
        first_sent: u64,
    },
    /// The request was queued at `timestamp`.
    Added {
        #[serde(with = "bigint")]
        timestamp: u64,
    },
    /// No peer knows the requested item.
    NotFound,
}

// ============================================================================
// Scripts Registry
// ============================================================================

/// A script registered with the light client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptStatus {
    pub script: Script,
    pub script_type: ScriptType,
    #[serde(with = "bigint")]
    pub block_number: u64,
}

// ============================================================================
// Indexer
// ============================================================================

/// Optional narrowing of a [`SearchKey`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchKeyFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<Script>,
    #[serde(with = "bigint::option_range", default, skip_serializing_if = "Option::is_none")]
    pub script_len_range: Option<[u64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data_search_mode: Option<OutputDataSearchMode>,
    #[serde(with = "bigint::option_range", default, skip_serializing_if = "Option::is_none")]
    pub output_data_len_range: Option<[u64; 2]>,
    #[serde(with = "bigint::option_range", default, skip_serializing_if = "Option::is_none")]
    pub output_capacity_range: Option<[u64; 2]>,
    #[serde(with = "bigint::option_range", default, skip_serializing_if = "Option::is_none")]
    pub block_range: Option<[u64; 2]>,
}

/// Search key for cell and transaction queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
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

/// A live cell with its position in the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub out_point: OutPoint,
    pub cell_output: CellOutput,
    #[serde(default)]
    pub output_data: Bytes,
    #[serde(with = "bigint")]
    pub block_number: u64,
    #[serde(with = "bigint")]
    pub tx_index: u32,
}

/// Result of `client.getCells`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellsPage {
    pub cells: Vec<Cell>,
    pub last_cursor: String,
}

/// One transaction per matching cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxWithCell {
    pub transaction: Transaction,
    #[serde(with = "bigint")]
    pub block_number: u64,
    #[serde(with = "bigint")]
    pub tx_index: u32,
    #[serde(with = "bigint")]
    pub io_index: u32,
    pub io_type: IoType,
}

/// One transaction with all of its matching cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxWithCells {
    pub transaction: Transaction,
    #[serde(with = "bigint")]
    pub block_number: u64,
    #[serde(with = "bigint")]
    pub tx_index: u32,
    pub cells: Vec<(IoType, JsInt<u32>)>,
}

/// Result of `client.getTransactions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsPage<T> {
    pub transactions: Vec<T>,
    pub last_cursor: String,
}

/// Capacity total together with the tip it was computed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellsCapacity {
    #[serde(with = "bigint")]
    pub capacity: u64,
    pub block_hash: H256,
    #[serde(with = "bigint")]
    pub block_number: u64,
}

// ============================================================================
// Network
// ============================================================================

/// A known address of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAddress {
    pub address: String,
    #[serde(with = "bigint")]
    pub score: u64,
}

/// A protocol opened with a remote node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNodeProtocol {
    #[serde(with = "bigint")]
    pub id: u64,
    pub version: String,
}

/// Best known headers claimed by a peer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerSyncState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_best_known_header: Option<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proved_best_known_header: Option<Header>,
}

/// A connected peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteNode {
    pub version: String,
    pub node_id: String,
    pub addresses: Vec<NodeAddress>,
    /// Some client builds misspell this as `connestedDuration`.
    #[serde(with = "bigint", alias = "connestedDuration")]
    pub connected_duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_state: Option<PeerSyncState>,
    pub protocols: Vec<RemoteNodeProtocol>,
}

/// A protocol supported by the local node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalNodeProtocol {
    #[serde(with = "bigint")]
    pub id: u64,
    pub name: String,
    #[serde(alias = "supportVersion")]
    pub support_versions: Vec<String>,
}

/// Result of `client.localNodeInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalNode {
    pub version: String,
    pub node_id: String,
    pub active: bool,
    pub addresses: Vec<NodeAddress>,
    pub protocols: Vec<LocalNodeProtocol>,
    #[serde(with = "bigint")]
    pub connections: u64,
}

// ============================================================================
// Tests
// ============================================================================
