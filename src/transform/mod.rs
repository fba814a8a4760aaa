//! Conversion between wire and domain records.
//!
//! Wire to domain is `TryFrom<wire::T> for domain::T`; it validates every hex
//! field and fails with [`Error::Decode`](crate::Error::Decode) naming the
//! offending field path. Domain to wire is `From<domain::T> for wire::T` and
//! cannot fail.
//!
//! | Module | Entities |
//! |--------|----------|
//! | `chain` | Script, OutPoint, CellInput, CellOutput, CellDep, Transaction |
//! | `header` | Header (DAO, epoch), UncleBlock, Block |
//! | `indexer` | SearchKey, filters, ranges, cell and transaction pages |
//! | `node` | RemoteNode, LocalNode, sync state |
//! | `response` | TransactionResponse, FetchResponse, ScriptStatus, capacity |
//! | [`hex`] | Wire integer and byte codec |
//! | [`molecule`] | Canonical encoding for the transaction hash |
//!
//! Where the mapping depends on request context (an absent transaction, the
//! `with_data` flag), free functions are provided instead of trait impls.

// ============================================================================
// Imports
// ============================================================================

use crate::error::{DecodeResultExt, Result};

// ============================================================================
// Submodules
// ============================================================================

mod chain;
mod header;
mod indexer;
mod node;
mod response;

/// Wire hex codec.
pub mod hex;

/// Canonical serialization and hashing.
pub mod molecule;

#[cfg(test)]
pub(crate) mod fixtures;

// ============================================================================
// Re-exports
// ============================================================================

pub use header::{epoch_from_packed, epoch_to_packed, pack_dao, unpack_dao};
pub use indexer::cells_page_to_wire;
pub use response::{
    fetch_response_from_wire, fetch_response_to_wire, transaction_response_from_wire,
    transaction_response_to_wire,
};

// ============================================================================
// Helpers
// ============================================================================

/// Converts every item, tagging a failure with its index.
pub(crate) fn try_map<W, D>(items: Vec<W>, mut convert: impl FnMut(W) -> Result<D>) -> Result<Vec<D>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| convert(item).at_index(index))
        .collect()
}

/// Converts every item of a total mapping.
pub(crate) fn map_into<D, W: From<D>>(items: Vec<D>) -> Vec<W> {
    items.into_iter().map(W::from).collect()
}
