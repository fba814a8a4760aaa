//! Canonical serialization used for transaction hashing.
//!
//! The transaction hash is blake2b-256 (personalization `ckb-default-hash`)
//! of the molecule encoding of the raw transaction, i.e. everything but the
//! witnesses.
//!
//! | Layout | Encoding |
//! |--------|----------|
//! | struct | fields back to back |
//! | fixvec | `u32` item count, then items |
//! | dynvec | `u32` total size, `u32` offset per item, then items |
//! | table | `u32` total size, `u32` offset per field, then fields |
//! | option | empty, or the inner value |
//!
//! All integers are little-endian.

// ============================================================================
// Imports
// ============================================================================

use blake2b_simd::Params;

use crate::schema::H256;
use crate::schema::domain::{
    CellDep, CellInput, CellOutput, DepType, HashType, OutPoint, Script, Transaction,
};

// ============================================================================
// Constants
// ============================================================================

const PERSONALIZATION: &[u8; 16] = b"ckb-default-hash";

const HEADER_UNIT: usize = 4;

// ============================================================================
// Hashing
// ============================================================================

/// Computes the hash of a transaction.
#[must_use]
pub fn transaction_hash(tx: &Transaction) -> H256 {
    blake2b_256(&raw_transaction(tx))
}

/// blake2b-256 with the chain's personalization.
#[must_use]
pub fn blake2b_256(data: &[u8]) -> H256 {
    let hash = Params::new()
        .hash_length(32)
        .personal(PERSONALIZATION)
        .hash(data);

    let mut out = [0u8; 32];
    out.copy_from_slice(hash.as_bytes());
    H256::new(out)
}

// ============================================================================
// Entities
// ============================================================================

/// Encodes a `RawTransaction` table.
#[must_use]
pub fn raw_transaction(tx: &Transaction) -> Vec<u8> {
    let cell_deps: Vec<Vec<u8>> = tx.cell_deps.iter().map(cell_dep).collect();
    let header_deps: Vec<Vec<u8>> = tx.header_deps.iter().map(|h| h.as_bytes().to_vec()).collect();
    let inputs: Vec<Vec<u8>> = tx.inputs.iter().map(cell_input).collect();
    let outputs: Vec<Vec<u8>> = tx.outputs.iter().map(cell_output).collect();
    let outputs_data: Vec<Vec<u8>> = tx.outputs_data.iter().map(|d| bytes(d.as_slice())).collect();

    table(&[
        tx.version.to_le_bytes().to_vec(),
        fixvec(&cell_deps),
        fixvec(&header_deps),
        fixvec(&inputs),
        dynvec(&outputs),
        dynvec(&outputs_data),
    ])
}

/// Encodes a `Script` table.
#[must_use]
pub fn script(script: &Script) -> Vec<u8> {
    table(&[
        script.code_hash.as_bytes().to_vec(),
        vec![hash_type(script.hash_type)],
        bytes(script.args.as_slice()),
    ])
}

fn out_point(out_point: &OutPoint) -> Vec<u8> {
    let mut buf = Vec::with_capacity(36);
    buf.extend_from_slice(out_point.tx_hash.as_bytes());
    buf.extend_from_slice(&out_point.index.to_le_bytes());
    buf
}

fn cell_dep(dep: &CellDep) -> Vec<u8> {
    let mut buf = out_point(&dep.out_point);
    buf.push(match dep.dep_type {
        DepType::Code => 0,
        DepType::DepGroup => 1,
    });
    buf
}

fn cell_input(input: &CellInput) -> Vec<u8> {
    let mut buf = Vec::with_capacity(44);
    buf.extend_from_slice(&input.since.to_le_bytes());
    buf.extend_from_slice(&out_point(&input.previous_output));
    buf
}

fn cell_output(output: &CellOutput) -> Vec<u8> {
    table(&[
        output.capacity.to_le_bytes().to_vec(),
        script(&output.lock),
        output.type_.as_ref().map(script).unwrap_or_default(),
    ])
}

fn hash_type(hash_type: HashType) -> u8 {
    match hash_type {
        HashType::Data => 0,
        HashType::Type => 1,
        HashType::Data1 => 2,
        HashType::Data2 => 4,
    }
}

// ============================================================================
// Layouts
// ============================================================================

fn u32_le(value: usize) -> [u8; 4] {
    // Molecule header words are u32.
    (value as u32).to_le_bytes()
}

/// `Bytes` is a fixvec of `byte`.
fn bytes(data: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_UNIT + data.len());
    buf.extend_from_slice(&u32_le(data.len()));
    buf.extend_from_slice(data);
    buf
}

fn fixvec(items: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_UNIT + items.iter().map(Vec::len).sum::<usize>());
    buf.extend_from_slice(&u32_le(items.len()));
    for item in items {
        buf.extend_from_slice(item);
    }
    buf
}

/// Tables and dynvecs share the offset-header layout.
fn with_offsets(parts: &[Vec<u8>]) -> Vec<u8> {
    let header_size = HEADER_UNIT * (parts.len() + 1);
    let total = header_size + parts.iter().map(Vec::len).sum::<usize>();

    let mut buf = Vec::with_capacity(total);
    buf.extend_from_slice(&u32_le(total));

    let mut offset = header_size;
    for part in parts {
        buf.extend_from_slice(&u32_le(offset));
        offset += part.len();
    }
    for part in parts {
        buf.extend_from_slice(part);
    }
    buf
}

fn dynvec(items: &[Vec<u8>]) -> Vec<u8> {
    with_offsets(items)
}

fn table(fields: &[Vec<u8>]) -> Vec<u8> {
    with_offsets(fields)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::schema::{Bytes, wire};
    use crate::transform::hex::encode_h256;

    fn read_u32(buf: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
    }

    fn empty_script() -> Script {
        Script {
            code_hash: H256::default(),
            hash_type: HashType::Data,
            args: Bytes::default(),
        }
    }

    fn empty_tx() -> Transaction {
        Transaction {
            version: 0,
            cell_deps: Vec::new(),
            header_deps: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            outputs_data: Vec::new(),
            witnesses: Vec::new(),
        }
    }

    #[test]
    fn test_script_layout() {
        let encoded = script(&empty_script());
        assert_eq!(encoded.len(), 53);
        assert_eq!(read_u32(&encoded, 0), 53);
        assert_eq!(read_u32(&encoded, 4), 16);
        assert_eq!(read_u32(&encoded, 8), 48);
        assert_eq!(read_u32(&encoded, 12), 49);
    }

    #[test]
    fn test_empty_dynvec_is_header_only() {
        assert_eq!(dynvec(&[]), vec![4, 0, 0, 0]);
        assert_eq!(fixvec(&[]), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_empty_raw_transaction_layout() {
        // 7 header words, version, 3 empty fixvecs, 2 empty dynvecs.
        let encoded = raw_transaction(&empty_tx());
        assert_eq!(encoded.len(), 28 + 4 + 3 * 4 + 2 * 4);
        assert_eq!(read_u32(&encoded, 0) as usize, encoded.len());
    }

    #[test]
    fn test_hash_ignores_witnesses() {
        let tx = empty_tx();
        let mut witnessed = tx.clone();
        witnessed.witnesses.push(Bytes::new(vec![1, 2, 3]));
        assert_eq!(transaction_hash(&tx), transaction_hash(&witnessed));
    }

    #[test]
    fn test_hash_covers_outputs() {
        let tx = empty_tx();
        let mut with_output = tx.clone();
        with_output.outputs.push(CellOutput {
            capacity: 6_100_000_000,
            lock: empty_script(),
            type_: None,
        });
        with_output.outputs_data.push(Bytes::default());
        assert_ne!(transaction_hash(&tx), transaction_hash(&with_output));
    }

    #[test]
    fn test_type_script_presence_changes_encoding() {
        let without = CellOutput {
            capacity: 1,
            lock: empty_script(),
            type_: None,
        };
        let with = CellOutput {
            type_: Some(empty_script()),
            ..without.clone()
        };
        assert_eq!(cell_output(&with).len(), cell_output(&without).len() + 53);
    }

    #[test]
    fn test_blank_hash() {
        assert_eq!(
            encode_h256(&blake2b_256(&[])).as_str(),
            "0x44f4c69744d5f8c55d642062949dcae49bc4e7ef43d388c5a12f42b5633d163e"
        );
    }

    #[test]
    fn test_known_transaction_hash() {
        // Sample transaction from the node's RPC reference.
        let tx: wire::Transaction = serde_json::from_value(json!({
            "version": "0x0",
            "cell_deps": [{
                "out_point": {
                    "tx_hash": "0xa4037a893eb48e18ed4ef61034ce26eba9c585f15c9cee102ae58505565eccc3",
                    "index": "0x0",
                },
                "dep_type": "code",
            }],
            "header_deps": ["0x7978ec7ce5b507cfb52e149e36b1a23f6062ed150503c85bbf825da3599095ed"],
            "inputs": [{
                "previous_output": {
                    "tx_hash": "0x365698b50ca0da75dca2c87f9e7b563811d3b5813736b8cc62cc3b106faceb17",
                    "index": "0x0",
                },
                "since": "0x0",
            }],
            "outputs": [{
                "capacity": "0x2540be400",
                "lock": {
                    "code_hash": "0x28e83a1277d48add8e72fadaa9248559e1b632bab2bd60b27955ebc4c03800a5",
                    "hash_type": "data",
                    "args": "0x",
                },
                "type": null,
            }],
            "outputs_data": ["0x"],
            "witnesses": [],
        }))
        .expect("wire transaction");
        let tx = Transaction::try_from(tx).expect("domain transaction");

        assert_eq!(
            encode_h256(&transaction_hash(&tx)).as_str(),
            "0xa0ef4eb5f4ceeb08a4c8524d84c5da95dce2f608e0ca2ec8091191b0f330c6e3"
        );
    }
}
