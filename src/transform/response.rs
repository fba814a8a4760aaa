//! Transaction responses, fetch responses, registered scripts and capacity.

// ============================================================================
// Imports
// ============================================================================

use crate::error::{DecodeResultExt, Error, Result};
use crate::schema::{domain, wire};

use super::hex::{decode_h256, decode_uint, encode_h256, encode_uint};

// ============================================================================
// Enumerations
// ============================================================================

impl From<wire::Status> for domain::TransactionStatus {
    fn from(value: wire::Status) -> Self {
        match value {
            wire::Status::Pending => Self::Pending,
            wire::Status::Proposed => Self::Proposed,
            wire::Status::Committed => Self::Committed,
            wire::Status::Unknown => Self::Unknown,
            wire::Status::Rejected => Self::Rejected,
        }
    }
}

impl From<domain::TransactionStatus> for wire::Status {
    fn from(value: domain::TransactionStatus) -> Self {
        match value {
            domain::TransactionStatus::Pending => Self::Pending,
            domain::TransactionStatus::Proposed => Self::Proposed,
            domain::TransactionStatus::Committed => Self::Committed,
            domain::TransactionStatus::Unknown => Self::Unknown,
            domain::TransactionStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<wire::SetScriptsCommand> for domain::SetScriptsCommand {
    fn from(value: wire::SetScriptsCommand) -> Self {
        match value {
            wire::SetScriptsCommand::All => Self::All,
            wire::SetScriptsCommand::Partial => Self::Partial,
            wire::SetScriptsCommand::Delete => Self::Delete,
        }
    }
}

impl From<domain::SetScriptsCommand> for wire::SetScriptsCommand {
    fn from(value: domain::SetScriptsCommand) -> Self {
        match value {
            domain::SetScriptsCommand::All => Self::All,
            domain::SetScriptsCommand::Partial => Self::Partial,
            domain::SetScriptsCommand::Delete => Self::Delete,
        }
    }
}

// ============================================================================
// Transaction Response
// ============================================================================

/// Converts a transaction lookup result.
///
/// An absent response becomes the `unknown` record with null fields.
#[must_use]
pub fn transaction_response_to_wire(
    response: Option<domain::TransactionResponse>,
) -> wire::TransactionWithStatus {
    let Some(response) = response else {
        return wire::TransactionWithStatus::unknown();
    };

    wire::TransactionWithStatus {
        transaction: Some(response.transaction.into()),
        cycles: response.cycles.map(encode_uint),
        tx_status: wire::TxStatus {
            status: response.status.into(),
            block_hash: response.block_hash.as_ref().map(encode_h256),
            block_number: response.block_number.map(encode_uint),
            tx_index: response.tx_index.map(encode_uint),
            reason: response.reason,
        },
    }
}

/// Converts a wire transaction lookup result.
///
/// A record without a transaction decodes as `None`.
///
/// # Errors
///
/// Returns [`Error::Decode`] if any field is malformed.
pub fn transaction_response_from_wire(
    value: wire::TransactionWithStatus,
) -> Result<Option<domain::TransactionResponse>> {
    let Some(transaction) = value.transaction else {
        return Ok(None);
    };
    let status = value.tx_status;

    Ok(Some(domain::TransactionResponse {
        transaction: domain::Transaction::try_from(transaction).within("transaction")?,
        status: status.status.into(),
        cycles: value
            .cycles
            .as_ref()
            .map(decode_uint)
            .transpose()
            .within("cycles")?,
        block_hash: status
            .block_hash
            .as_ref()
            .map(decode_h256)
            .transpose()
            .within("block_hash")
            .within("tx_status")?,
        block_number: status
            .block_number
            .as_ref()
            .map(decode_uint)
            .transpose()
            .within("block_number")
            .within("tx_status")?,
        tx_index: status
            .tx_index
            .as_ref()
            .map(decode_uint)
            .transpose()
            .within("tx_index")
            .within("tx_status")?,
        reason: status.reason,
    }))
}

// ============================================================================
// Fetch Response
// ============================================================================

/// Converts a fetch response, mapping fetched data with `convert`.
pub fn fetch_response_to_wire<D, W>(
    response: domain::FetchResponse<D>,
    convert: impl FnOnce(D) -> W,
) -> wire::FetchResponse<W> {
    match response {
        domain::FetchResponse::Fetched { data } => wire::FetchResponse::Fetched {
            data: convert(data),
        },
        domain::FetchResponse::Fetching { first_sent } => wire::FetchResponse::Fetching {
            first_sent: encode_uint(first_sent),
        },
        domain::FetchResponse::Added { timestamp } => wire::FetchResponse::Added {
            timestamp: encode_uint(timestamp),
        },
        domain::FetchResponse::NotFound => wire::FetchResponse::NotFound,
    }
}

/// Converts a wire fetch response, decoding fetched data with `convert`.
///
/// # Errors
///
/// Returns [`Error::Decode`] if a timestamp or the data is malformed.
pub fn fetch_response_from_wire<W, D>(
    response: wire::FetchResponse<W>,
    convert: impl FnOnce(W) -> Result<D>,
) -> Result<domain::FetchResponse<D>> {
    Ok(match response {
        wire::FetchResponse::Fetched { data } => domain::FetchResponse::Fetched {
            data: convert(data).within("data")?,
        },
        wire::FetchResponse::Fetching { first_sent } => domain::FetchResponse::Fetching {
            first_sent: decode_uint(&first_sent).within("first_sent")?,
        },
        wire::FetchResponse::Added { timestamp } => domain::FetchResponse::Added {
            timestamp: decode_uint(&timestamp).within("timestamp")?,
        },
        wire::FetchResponse::NotFound => domain::FetchResponse::NotFound,
    })
}

// ============================================================================
// Scripts Registry
// ============================================================================

impl TryFrom<wire::ScriptStatus> for domain::ScriptStatus {
    type Error = Error;

    fn try_from(value: wire::ScriptStatus) -> Result<Self> {
        Ok(Self {
            script: domain::Script::try_from(value.script).within("script")?,
            script_type: value.script_type.into(),
            block_number: decode_uint(&value.block_number).within("block_number")?,
        })
    }
}

impl From<domain::ScriptStatus> for wire::ScriptStatus {
    fn from(value: domain::ScriptStatus) -> Self {
        Self {
            script: value.script.into(),
            script_type: value.script_type.into(),
            block_number: encode_uint(value.block_number),
        }
    }
}

// ============================================================================
// Capacity
// ============================================================================

impl TryFrom<wire::CellsCapacity> for domain::CellsCapacity {
    type Error = Error;

    fn try_from(value: wire::CellsCapacity) -> Result<Self> {
        Ok(Self {
            capacity: decode_uint(&value.capacity).within("capacity")?,
            block_hash: decode_h256(&value.block_hash).within("block_hash")?,
            block_number: decode_uint(&value.block_number).within("block_number")?,
        })
    }
}

impl From<domain::CellsCapacity> for wire::CellsCapacity {
    fn from(value: domain::CellsCapacity) -> Self {
        Self {
            block_hash: encode_h256(&value.block_hash),
            block_number: encode_uint(value.block_number),
            capacity: encode_uint(value.capacity),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
