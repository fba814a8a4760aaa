//! Headers, uncles and blocks.
//!
//! Two header fields are bit-packed on the wire:
//!
//! | Field | Wire | Domain |
//! |-------|------|--------|
//! | `dao` | 32 bytes: LE `c` ‖ LE `ar` ‖ LE `s` ‖ LE `u` | [`Dao`] |
//! | `epoch` | `number \| index << 24 \| length << 40` | [`Epoch`] |

// ============================================================================
// Imports
// ============================================================================

use crate::error::{DecodeResultExt, Error, Result};
use crate::schema::domain::{self, Dao, Epoch};
use crate::schema::{Bytes, wire};

use super::hex::{
    decode_bytes, decode_fixed, decode_h256, decode_uint, encode_bytes, encode_h256, encode_uint,
};
use super::{map_into, try_map};

// ============================================================================
// Constants
// ============================================================================

/// Length of the packed DAO field.
pub const DAO_LEN: usize = 32;

/// Length of a proposal short id.
pub const PROPOSAL_ID_LEN: usize = 10;

const EPOCH_NUMBER_BITS: u32 = 24;
const EPOCH_INDEX_BITS: u32 = 16;
const EPOCH_BITS: u32 = 56;

// ============================================================================
// DAO
// ============================================================================

/// Packs the DAO fields into their 32-byte wire layout.
#[must_use]
pub fn pack_dao(dao: &Dao) -> [u8; DAO_LEN] {
    let mut out = [0u8; DAO_LEN];
    for (chunk, field) in out.chunks_exact_mut(8).zip([dao.c, dao.ar, dao.s, dao.u]) {
        chunk.copy_from_slice(&field.to_le_bytes());
    }
    out
}

/// Unpacks a 32-byte DAO field.
///
/// # Errors
///
/// Returns [`Error::Decode`] if `bytes` is not exactly 32 bytes long.
pub fn unpack_dao(bytes: &[u8]) -> Result<Dao> {
    if bytes.len() != DAO_LEN {
        return Err(Error::decode(
            "",
            format!("expected {DAO_LEN} bytes, got {}", bytes.len()),
        ));
    }

    let mut fields = [0u64; 4];
    for (field, chunk) in fields.iter_mut().zip(bytes.chunks_exact(8)) {
        let mut le = [0u8; 8];
        le.copy_from_slice(chunk);
        *field = u64::from_le_bytes(le);
    }
    let [c, ar, s, u] = fields;
    Ok(Dao { c, ar, s, u })
}

// ============================================================================
// Epoch
// ============================================================================

/// Packs an epoch position into its integer form.
#[must_use]
pub fn epoch_to_packed(epoch: &Epoch) -> u64 {
    u64::from(epoch.number())
        | u64::from(epoch.index()) << EPOCH_NUMBER_BITS
        | u64::from(epoch.length()) << (EPOCH_NUMBER_BITS + EPOCH_INDEX_BITS)
}

/// Unpacks an epoch position.
///
/// # Errors
///
/// Returns [`Error::Decode`] if `packed` uses more than 56 bits.
pub fn epoch_from_packed(packed: u64) -> Result<Epoch> {
    if packed >> EPOCH_BITS != 0 {
        return Err(Error::decode(
            "",
            format!("{packed:#x} exceeds {EPOCH_BITS} bits"),
        ));
    }

    let number = (packed & 0xff_ffff) as u32;
    let index = ((packed >> EPOCH_NUMBER_BITS) & 0xffff) as u16;
    let length = ((packed >> (EPOCH_NUMBER_BITS + EPOCH_INDEX_BITS)) & 0xffff) as u16;

    Epoch::new(number, index, length).ok_or_else(|| Error::decode("", "epoch number overflow"))
}

// ============================================================================
// Header
// ============================================================================

impl TryFrom<wire::Header> for domain::Header {
    type Error = Error;

    fn try_from(value: wire::Header) -> Result<Self> {
        let dao = decode_bytes(&value.dao)
            .and_then(|bytes| unpack_dao(bytes.as_slice()))
            .within("dao")?;
        let epoch = decode_uint(&value.epoch)
            .and_then(epoch_from_packed)
            .within("epoch")?;

        Ok(Self {
            compact_target: decode_uint(&value.compact_target).within("compact_target")?,
            dao,
            epoch,
            extra_hash: decode_h256(&value.extra_hash).within("extra_hash")?,
            hash: decode_h256(&value.hash).within("hash")?,
            nonce: decode_uint(&value.nonce).within("nonce")?,
            number: decode_uint(&value.number).within("number")?,
            parent_hash: decode_h256(&value.parent_hash).within("parent_hash")?,
            proposals_hash: decode_h256(&value.proposals_hash).within("proposals_hash")?,
            timestamp: decode_uint(&value.timestamp).within("timestamp")?,
            transactions_root: decode_h256(&value.transactions_root)
                .within("transactions_root")?,
            version: decode_uint(&value.version).within("version")?,
        })
    }
}

impl From<domain::Header> for wire::Header {
    fn from(value: domain::Header) -> Self {
        Self {
            compact_target: encode_uint(value.compact_target),
            dao: encode_bytes(&pack_dao(&value.dao)),
            epoch: encode_uint(epoch_to_packed(&value.epoch)),
            extra_hash: encode_h256(&value.extra_hash),
            hash: encode_h256(&value.hash),
            nonce: encode_uint(value.nonce),
            number: encode_uint(value.number),
            parent_hash: encode_h256(&value.parent_hash),
            proposals_hash: encode_h256(&value.proposals_hash),
            timestamp: encode_uint(value.timestamp),
            transactions_root: encode_h256(&value.transactions_root),
            version: encode_uint(value.version),
        }
    }
}

// ============================================================================
// Blocks
// ============================================================================

fn decode_proposals(proposals: Vec<wire::Hex>) -> Result<Vec<Bytes>> {
    try_map(proposals, |p| {
        decode_fixed::<PROPOSAL_ID_LEN>(&p).map(|id| Bytes::from(id.as_slice()))
    })
    .within("proposals")
}

fn encode_proposals(proposals: &[Bytes]) -> Vec<wire::Hex> {
    proposals.iter().map(|p| encode_bytes(p.as_slice())).collect()
}

impl TryFrom<wire::UncleBlock> for domain::UncleBlock {
    type Error = Error;

    fn try_from(value: wire::UncleBlock) -> Result<Self> {
        Ok(Self {
            header: domain::Header::try_from(value.header).within("header")?,
            proposals: decode_proposals(value.proposals)?,
        })
    }
}

impl From<domain::UncleBlock> for wire::UncleBlock {
    fn from(value: domain::UncleBlock) -> Self {
        Self {
            proposals: encode_proposals(&value.proposals),
            header: value.header.into(),
        }
    }
}

impl TryFrom<wire::Block> for domain::Block {
    type Error = Error;

    fn try_from(value: wire::Block) -> Result<Self> {
        Ok(Self {
            header: domain::Header::try_from(value.header).within("header")?,
            proposals: decode_proposals(value.proposals)?,
            transactions: try_map(value.transactions, domain::Transaction::try_from)
                .within("transactions")?,
            uncles: try_map(value.uncles, domain::UncleBlock::try_from).within("uncles")?,
        })
    }
}

impl From<domain::Block> for wire::Block {
    fn from(value: domain::Block) -> Self {
        Self {
            proposals: encode_proposals(&value.proposals),
            header: value.header.into(),
            transactions: map_into(value.transactions),
            uncles: map_into(value.uncles),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use crate::transform::fixtures;

    #[test]
    fn test_unpack_dao_little_endian() {
        let dao = unpack_dao(&hex::decode(
            "0100000000000000020000000000000003000000000000000400000000000000",
        )
        .expect("hex"))
        .expect("unpack");
        assert_eq!(dao, Dao { c: 1, ar: 2, s: 3, u: 4 });
    }

    #[test]
    fn test_dao_wrong_length_names_field() {
        let mut header = fixtures::wire_header();
        header.dao = wire::Hex::from("0x0100");

        match domain::Header::try_from(header).unwrap_err() {
            Error::Decode { field, message } => {
                assert_eq!(field, "dao");
                assert!(message.contains("expected 32 bytes"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_epoch_packing() {
        let epoch = Epoch::new(0x123, 0x45, 0x708).expect("valid epoch");
        let packed = epoch_to_packed(&epoch);
        assert_eq!(packed, 0x0007_0800_4500_0123);
        assert_eq!(epoch_from_packed(packed).expect("unpack"), epoch);
    }

    #[test]
    fn test_epoch_over_56_bits() {
        let err = epoch_from_packed(1 << 56).unwrap_err();
        assert!(err.is_decode_error());
    }

    #[test]
    fn test_header_round_trips() {
        let wire_header = fixtures::wire_header();
        let domain_header = domain::Header::try_from(wire_header.clone()).expect("decode");
        assert_eq!(domain_header.dao, Dao { c: 1, ar: 2, s: 3, u: 4 });
        assert_eq!(wire::Header::from(domain_header), wire_header);

        let domain_header = fixtures::domain_header();
        let wire_header = wire::Header::from(domain_header.clone());
        assert_eq!(domain::Header::try_from(wire_header).expect("decode"), domain_header);
    }

    #[test]
    fn test_block_converts_uncles() {
        let uncle = domain::UncleBlock {
            header: fixtures::domain_header(),
            proposals: vec![Bytes::new(vec![7; PROPOSAL_ID_LEN])],
        };
        let block = domain::Block {
            header: fixtures::domain_header(),
            proposals: Vec::new(),
            transactions: vec![fixtures::domain_transaction()],
            uncles: vec![uncle],
        };

        let wire_block = wire::Block::from(block.clone());
        assert_eq!(wire_block.uncles.len(), 1);
        assert_eq!(wire_block.uncles[0].proposals[0].as_str(), "0x07070707070707070707");
        assert!(wire_block.transactions[0].hash.is_some());

        assert_eq!(domain::Block::try_from(wire_block).expect("decode"), block);
    }

    #[test]
    fn test_proposal_length_enforced() {
        let block = wire::Block {
            header: fixtures::wire_header(),
            proposals: vec![wire::Hex::from("0x0102")],
            transactions: Vec::new(),
            uncles: Vec::new(),
        };
        match domain::Block::try_from(block).unwrap_err() {
            Error::Decode { field, .. } => assert_eq!(field, "proposals[0]"),
            other => panic!("unexpected error: {other}"),
        }
    }

    proptest! {
        #[test]
        fn prop_dao_pack_unpack(c: u64, ar: u64, s: u64, u: u64) {
            let dao = Dao { c, ar, s, u };
            let packed = pack_dao(&dao);
            prop_assert_eq!(packed.len(), DAO_LEN);
            prop_assert_eq!(unpack_dao(&packed).expect("unpack"), dao);
        }

        #[test]
        fn prop_epoch_round_trip(number in 0u32..=Epoch::MAX_NUMBER, index: u16, length: u16) {
            let epoch = Epoch::new(number, index, length).expect("valid epoch");
            prop_assert_eq!(epoch_from_packed(epoch_to_packed(&epoch)).expect("unpack"), epoch);
        }
    }
}
