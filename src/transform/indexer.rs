//! Search keys and paginated search results.

// ============================================================================
// Imports
// ============================================================================

use crate::error::{DecodeResultExt, Error, Result};
use crate::schema::primitives::JsInt;
use crate::schema::{domain, wire};

use super::hex::{decode_bytes, decode_uint, encode_bytes, encode_uint};
use super::{map_into, try_map};

// ============================================================================
// Enumerations
// ============================================================================

impl From<wire::ScriptType> for domain::ScriptType {
    fn from(value: wire::ScriptType) -> Self {
        match value {
            wire::ScriptType::Lock => Self::Lock,
            wire::ScriptType::Type => Self::Type,
        }
    }
}

impl From<domain::ScriptType> for wire::ScriptType {
    fn from(value: domain::ScriptType) -> Self {
        match value {
            domain::ScriptType::Lock => Self::Lock,
            domain::ScriptType::Type => Self::Type,
        }
    }
}

impl From<wire::ScriptSearchMode> for domain::ScriptSearchMode {
    fn from(value: wire::ScriptSearchMode) -> Self {
        match value {
            wire::ScriptSearchMode::Prefix => Self::Prefix,
            wire::ScriptSearchMode::Exact => Self::Exact,
            wire::ScriptSearchMode::Partial => Self::Partial,
        }
    }
}

impl From<domain::ScriptSearchMode> for wire::ScriptSearchMode {
    fn from(value: domain::ScriptSearchMode) -> Self {
        match value {
            domain::ScriptSearchMode::Prefix => Self::Prefix,
            domain::ScriptSearchMode::Exact => Self::Exact,
            domain::ScriptSearchMode::Partial => Self::Partial,
        }
    }
}

impl From<wire::OutputDataFilterMode> for domain::OutputDataSearchMode {
    fn from(value: wire::OutputDataFilterMode) -> Self {
        match value {
            wire::OutputDataFilterMode::Prefix => Self::Prefix,
            wire::OutputDataFilterMode::Exact => Self::Exact,
            wire::OutputDataFilterMode::Partial => Self::Partial,
        }
    }
}

impl From<domain::OutputDataSearchMode> for wire::OutputDataFilterMode {
    fn from(value: domain::OutputDataSearchMode) -> Self {
        match value {
            domain::OutputDataSearchMode::Prefix => Self::Prefix,
            domain::OutputDataSearchMode::Exact => Self::Exact,
            domain::OutputDataSearchMode::Partial => Self::Partial,
        }
    }
}

impl From<wire::Order> for domain::Order {
    fn from(value: wire::Order) -> Self {
        match value {
            wire::Order::Asc => Self::Asc,
            wire::Order::Desc => Self::Desc,
        }
    }
}

impl From<domain::Order> for wire::Order {
    fn from(value: domain::Order) -> Self {
        match value {
            domain::Order::Asc => Self::Asc,
            domain::Order::Desc => Self::Desc,
        }
    }
}

impl From<wire::IoType> for domain::IoType {
    fn from(value: wire::IoType) -> Self {
        match value {
            wire::IoType::Input => Self::Input,
            wire::IoType::Output => Self::Output,
        }
    }
}

impl From<domain::IoType> for wire::IoType {
    fn from(value: domain::IoType) -> Self {
        match value {
            domain::IoType::Input => Self::Input,
            domain::IoType::Output => Self::Output,
        }
    }
}

// ============================================================================
// Ranges
// ============================================================================

fn decode_range(range: Option<[wire::Hex; 2]>, field: &str) -> Result<Option<[u64; 2]>> {
    let Some([start, end]) = range else {
        return Ok(None);
    };
    let start = decode_uint(&start).at_index(0).within(field)?;
    let end = decode_uint(&end).at_index(1).within(field)?;
    Ok(Some([start, end]))
}

fn encode_range(range: Option<[u64; 2]>) -> Option<[wire::Hex; 2]> {
    range.map(|[start, end]| [encode_uint(start), encode_uint(end)])
}

// ============================================================================
// Search Key
// ============================================================================

impl TryFrom<wire::SearchKeyFilter> for domain::SearchKeyFilter {
    type Error = Error;

    fn try_from(value: wire::SearchKeyFilter) -> Result<Self> {
        Ok(Self {
            script: value
                .script
                .map(domain::Script::try_from)
                .transpose()
                .within("script")?,
            script_len_range: decode_range(value.script_len_range, "script_len_range")?,
            output_data: value
                .output_data
                .as_ref()
                .map(decode_bytes)
                .transpose()
                .within("output_data")?,
            output_data_search_mode: value.output_data_filter_mode.map(Into::into),
            output_data_len_range: decode_range(
                value.output_data_len_range,
                "output_data_len_range",
            )?,
            output_capacity_range: decode_range(
                value.output_capacity_range,
                "output_capacity_range",
            )?,
            block_range: decode_range(value.block_range, "block_range")?,
        })
    }
}

impl From<domain::SearchKeyFilter> for wire::SearchKeyFilter {
    fn from(value: domain::SearchKeyFilter) -> Self {
        Self {
            script: value.script.map(Into::into),
            script_len_range: encode_range(value.script_len_range),
            output_data: value.output_data.map(|d| encode_bytes(d.as_slice())),
            output_data_filter_mode: value.output_data_search_mode.map(Into::into),
            output_data_len_range: encode_range(value.output_data_len_range),
            output_capacity_range: encode_range(value.output_capacity_range),
            block_range: encode_range(value.block_range),
        }
    }
}

impl TryFrom<wire::SearchKey> for domain::SearchKey {
    type Error = Error;

    fn try_from(value: wire::SearchKey) -> Result<Self> {
        Ok(Self {
            script: domain::Script::try_from(value.script).within("script")?,
            script_type: value.script_type.into(),
            script_search_mode: value.script_search_mode.map(Into::into),
            filter: value
                .filter
                .map(domain::SearchKeyFilter::try_from)
                .transpose()
                .within("filter")?,
            with_data: value.with_data,
            group_by_transaction: value.group_by_transaction,
        })
    }
}

impl From<domain::SearchKey> for wire::SearchKey {
    fn from(value: domain::SearchKey) -> Self {
        Self {
            script: value.script.into(),
            script_type: value.script_type.into(),
            script_search_mode: value.script_search_mode.map(Into::into),
            filter: value.filter.map(Into::into),
            with_data: value.with_data,
            group_by_transaction: value.group_by_transaction,
        }
    }
}

// ============================================================================
// Cells
// ============================================================================

/// Converts a cell, omitting `output_data` when `with_data` is `false`.
fn cell_to_wire(cell: domain::Cell, with_data: bool) -> wire::Cell {
    wire::Cell {
        out_point: cell.out_point.into(),
        output: cell.cell_output.into(),
        output_data: with_data.then(|| encode_bytes(cell.output_data.as_slice())),
        block_number: encode_uint(cell.block_number),
        tx_index: encode_uint(cell.tx_index),
    }
}

/// Converts a page of cells.
///
/// `with_data` is the flag of the search key that produced the page; only an
/// explicit `false` drops the cells' output data.
#[must_use]
pub fn cells_page_to_wire(
    page: domain::CellsPage,
    with_data: Option<bool>,
) -> wire::Pagination<wire::Cell> {
    let with_data = with_data != Some(false);
    wire::Pagination {
        objects: page
            .cells
            .into_iter()
            .map(|cell| cell_to_wire(cell, with_data))
            .collect(),
        last_cursor: page.last_cursor,
    }
}

/// A missing `output_data` decodes as empty bytes.
impl TryFrom<wire::Cell> for domain::Cell {
    type Error = Error;

    fn try_from(value: wire::Cell) -> Result<Self> {
        Ok(Self {
            out_point: domain::OutPoint::try_from(value.out_point).within("out_point")?,
            cell_output: domain::CellOutput::try_from(value.output).within("output")?,
            output_data: value
                .output_data
                .as_ref()
                .map(decode_bytes)
                .transpose()
                .within("output_data")?
                .unwrap_or_default(),
            block_number: decode_uint(&value.block_number).within("block_number")?,
            tx_index: decode_uint(&value.tx_index).within("tx_index")?,
        })
    }
}

impl TryFrom<wire::Pagination<wire::Cell>> for domain::CellsPage {
    type Error = Error;

    fn try_from(value: wire::Pagination<wire::Cell>) -> Result<Self> {
        Ok(Self {
            cells: try_map(value.objects, domain::Cell::try_from).within("objects")?,
            last_cursor: value.last_cursor,
        })
    }
}

// ============================================================================
// Transactions
// ============================================================================

impl TryFrom<wire::TxWithCell> for domain::TxWithCell {
    type Error = Error;

    fn try_from(value: wire::TxWithCell) -> Result<Self> {
        Ok(Self {
            transaction: domain::Transaction::try_from(value.transaction).within("transaction")?,
            block_number: decode_uint(&value.block_number).within("block_number")?,
            tx_index: decode_uint(&value.tx_index).within("tx_index")?,
            io_index: decode_uint(&value.io_index).within("io_index")?,
            io_type: value.io_type.into(),
        })
    }
}

impl From<domain::TxWithCell> for wire::TxWithCell {
    fn from(value: domain::TxWithCell) -> Self {
        Self {
            transaction: value.transaction.into(),
            block_number: encode_uint(value.block_number),
            tx_index: encode_uint(value.tx_index),
            io_index: encode_uint(value.io_index),
            io_type: value.io_type.into(),
        }
    }
}

impl TryFrom<wire::TxWithCells> for domain::TxWithCells {
    type Error = Error;

    fn try_from(value: wire::TxWithCells) -> Result<Self> {
        let cells: Vec<(domain::IoType, JsInt<u32>)> =
            try_map(value.cells, |(io_type, io_index)| {
                let io_index = decode_uint(&io_index).at_index(1)?;
                Ok((io_type.into(), JsInt(io_index)))
            })
            .within("cells")?;

        Ok(Self {
            transaction: domain::Transaction::try_from(value.transaction).within("transaction")?,
            block_number: decode_uint(&value.block_number).within("block_number")?,
            tx_index: decode_uint(&value.tx_index).within("tx_index")?,
            cells,
        })
    }
}

impl From<domain::TxWithCells> for wire::TxWithCells {
    fn from(value: domain::TxWithCells) -> Self {
        Self {
            transaction: value.transaction.into(),
            block_number: encode_uint(value.block_number),
            tx_index: encode_uint(value.tx_index),
            cells: value
                .cells
                .into_iter()
                .map(|(io_type, JsInt(io_index))| (io_type.into(), encode_uint(io_index)))
                .collect(),
        }
    }
}

/// Page conversions for both transaction layouts.
macro_rules! transactions_page {
    ($domain:ty, $wire:ty) => {
        impl From<domain::TransactionsPage<$domain>> for wire::Pagination<$wire> {
            fn from(value: domain::TransactionsPage<$domain>) -> Self {
                Self {
                    objects: map_into(value.transactions),
                    last_cursor: value.last_cursor,
                }
            }
        }

        impl TryFrom<wire::Pagination<$wire>> for domain::TransactionsPage<$domain> {
            type Error = Error;

            fn try_from(value: wire::Pagination<$wire>) -> Result<Self> {
                Ok(Self {
                    transactions: try_map(value.objects, <$domain>::try_from).within("objects")?,
                    last_cursor: value.last_cursor,
                })
            }
        }
    };
}

transactions_page!(domain::TxWithCell, wire::TxWithCell);
transactions_page!(domain::TxWithCells, wire::TxWithCells);

impl From<domain::TransactionsPage<domain::TxWithCell>> for wire::TransactionsPage {
    fn from(value: domain::TransactionsPage<domain::TxWithCell>) -> Self {
        Self::Ungrouped(value.into())
    }
}

impl From<domain::TransactionsPage<domain::TxWithCells>> for wire::TransactionsPage {
    fn from(value: domain::TransactionsPage<domain::TxWithCells>) -> Self {
        Self::Grouped(value.into())
    }
}

// ============================================================================
// Tests
// ============================================================================
