//! Scripts, out points, cells and transactions.

// ============================================================================
// Imports
// ============================================================================

use crate::error::{DecodeResultExt, Error, Result};
use crate::schema::{domain, wire};

use super::hex::{decode_bytes, decode_h256, decode_uint, encode_bytes, encode_h256, encode_uint};
use super::molecule::transaction_hash;
use super::try_map;

// ============================================================================
// Enumerations
// ============================================================================

impl From<wire::HashType> for domain::HashType {
    fn from(value: wire::HashType) -> Self {
        match value {
            wire::HashType::Data => Self::Data,
            wire::HashType::Type => Self::Type,
            wire::HashType::Data1 => Self::Data1,
            wire::HashType::Data2 => Self::Data2,
        }
    }
}

impl From<domain::HashType> for wire::HashType {
    fn from(value: domain::HashType) -> Self {
        match value {
            domain::HashType::Data => Self::Data,
            domain::HashType::Type => Self::Type,
            domain::HashType::Data1 => Self::Data1,
            domain::HashType::Data2 => Self::Data2,
        }
    }
}

impl From<wire::DepType> for domain::DepType {
    fn from(value: wire::DepType) -> Self {
        match value {
            wire::DepType::Code => Self::Code,
            wire::DepType::DepGroup => Self::DepGroup,
        }
    }
}

impl From<domain::DepType> for wire::DepType {
    fn from(value: domain::DepType) -> Self {
        match value {
            domain::DepType::Code => Self::Code,
            domain::DepType::DepGroup => Self::DepGroup,
        }
    }
}

// ============================================================================
// Script
// ============================================================================

impl TryFrom<wire::Script> for domain::Script {
    type Error = Error;

    fn try_from(value: wire::Script) -> Result<Self> {
        Ok(Self {
            code_hash: decode_h256(&value.code_hash).within("code_hash")?,
            hash_type: value.hash_type.into(),
            args: decode_bytes(&value.args).within("args")?,
        })
    }
}

impl From<domain::Script> for wire::Script {
    fn from(value: domain::Script) -> Self {
        Self {
            code_hash: encode_h256(&value.code_hash),
            hash_type: value.hash_type.into(),
            args: encode_bytes(value.args.as_slice()),
        }
    }
}

// ============================================================================
// Cells
// ============================================================================

impl TryFrom<wire::OutPoint> for domain::OutPoint {
    type Error = Error;

    fn try_from(value: wire::OutPoint) -> Result<Self> {
        Ok(Self {
            tx_hash: decode_h256(&value.tx_hash).within("tx_hash")?,
            index: decode_uint(&value.index).within("index")?,
        })
    }
}

impl From<domain::OutPoint> for wire::OutPoint {
    fn from(value: domain::OutPoint) -> Self {
        Self {
            tx_hash: encode_h256(&value.tx_hash),
            index: encode_uint(value.index),
        }
    }
}

impl TryFrom<wire::CellInput> for domain::CellInput {
    type Error = Error;

    fn try_from(value: wire::CellInput) -> Result<Self> {
        Ok(Self {
            previous_output: domain::OutPoint::try_from(value.previous_output)
                .within("previous_output")?,
            since: decode_uint(&value.since).within("since")?,
        })
    }
}

impl From<domain::CellInput> for wire::CellInput {
    fn from(value: domain::CellInput) -> Self {
        Self {
            previous_output: value.previous_output.into(),
            since: encode_uint(value.since),
        }
    }
}

impl TryFrom<wire::CellOutput> for domain::CellOutput {
    type Error = Error;

    fn try_from(value: wire::CellOutput) -> Result<Self> {
        Ok(Self {
            capacity: decode_uint(&value.capacity).within("capacity")?,
            lock: domain::Script::try_from(value.lock).within("lock")?,
            type_: value
                .type_
                .map(domain::Script::try_from)
                .transpose()
                .within("type")?,
        })
    }
}

impl From<domain::CellOutput> for wire::CellOutput {
    fn from(value: domain::CellOutput) -> Self {
        Self {
            capacity: encode_uint(value.capacity),
            lock: value.lock.into(),
            type_: value.type_.map(Into::into),
        }
    }
}

impl TryFrom<wire::CellDep> for domain::CellDep {
    type Error = Error;

    fn try_from(value: wire::CellDep) -> Result<Self> {
        Ok(Self {
            out_point: domain::OutPoint::try_from(value.out_point).within("out_point")?,
            dep_type: value.dep_type.into(),
        })
    }
}

impl From<domain::CellDep> for wire::CellDep {
    fn from(value: domain::CellDep) -> Self {
        Self {
            out_point: value.out_point.into(),
            dep_type: value.dep_type.into(),
        }
    }
}

// ============================================================================
// Transaction
// ============================================================================

/// Drops the wire `hash`; it is never trusted.
impl TryFrom<wire::Transaction> for domain::Transaction {
    type Error = Error;

    fn try_from(value: wire::Transaction) -> Result<Self> {
        if value.outputs.len() != value.outputs_data.len() {
            return Err(Error::decode(
                "outputs_data",
                format!(
                    "expected {} entries to match outputs, got {}",
                    value.outputs.len(),
                    value.outputs_data.len()
                ),
            ));
        }

        Ok(Self {
            version: decode_uint(&value.version).within("version")?,
            cell_deps: try_map(value.cell_deps, domain::CellDep::try_from).within("cell_deps")?,
            header_deps: try_map(value.header_deps, |h| decode_h256(&h)).within("header_deps")?,
            inputs: try_map(value.inputs, domain::CellInput::try_from).within("inputs")?,
            outputs: try_map(value.outputs, domain::CellOutput::try_from).within("outputs")?,
            outputs_data: try_map(value.outputs_data, |d| decode_bytes(&d))
                .within("outputs_data")?,
            witnesses: try_map(value.witnesses, |w| decode_bytes(&w)).within("witnesses")?,
        })
    }
}

/// Recomputes the wire `hash` from the body.
impl From<domain::Transaction> for wire::Transaction {
    fn from(value: domain::Transaction) -> Self {
        let hash = encode_h256(&transaction_hash(&value));

        Self {
            version: encode_uint(value.version),
            cell_deps: value.cell_deps.into_iter().map(Into::into).collect(),
            header_deps: value.header_deps.iter().map(encode_h256).collect(),
            inputs: value.inputs.into_iter().map(Into::into).collect(),
            outputs: value.outputs.into_iter().map(Into::into).collect(),
            outputs_data: value
                .outputs_data
                .iter()
                .map(|d| encode_bytes(d.as_slice()))
                .collect(),
            witnesses: value
                .witnesses
                .iter()
                .map(|w| encode_bytes(w.as_slice()))
                .collect(),
            hash: Some(hash),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::transform::fixtures;

    #[test]
    fn test_script_round_trip() {
        let wire_script = fixtures::wire_script();
        let domain_script = domain::Script::try_from(wire_script.clone()).expect("decode");
        assert_eq!(domain_script.hash_type, domain::HashType::Type);
        assert_eq!(wire::Script::from(domain_script), wire_script);
    }

    #[test]
    fn test_dep_type_respelled() {
        let dep: wire::CellDep = serde_json::from_value(json!({
            "out_point": {"tx_hash": fixtures::hash_hex(7), "index": "0x0"},
            "dep_type": "dep_group",
        }))
        .expect("parse");

        let domain_dep = domain::CellDep::try_from(dep).expect("decode");
        let value = serde_json::to_value(&domain_dep).expect("serialize");
        assert_eq!(value["depType"], json!("depGroup"));
    }

    #[test]
    fn test_transaction_round_trip_recomputes_hash() {
        let mut wire_tx = fixtures::wire_transaction();
        wire_tx.hash = Some(wire::Hex::from(fixtures::hash_hex(0xee)));

        let domain_tx = domain::Transaction::try_from(wire_tx.clone()).expect("decode");
        let back = wire::Transaction::from(domain_tx.clone());

        let expected_hash = encode_h256(&transaction_hash(&domain_tx));
        assert_eq!(back.hash.as_ref(), Some(&expected_hash));
        assert_ne!(back.hash, wire_tx.hash);

        let mut without_hash = back;
        without_hash.hash = None;
        wire_tx.hash = None;
        assert_eq!(without_hash, wire_tx);
    }

    #[test]
    fn test_domain_transaction_round_trip() {
        let domain_tx = fixtures::domain_transaction();
        let wire_tx = wire::Transaction::from(domain_tx.clone());
        assert_eq!(domain::Transaction::try_from(wire_tx).expect("decode"), domain_tx);
    }

    #[test]
    fn test_outputs_data_arity() {
        let mut wire_tx = fixtures::wire_transaction();
        wire_tx.outputs_data.pop();

        let err = domain::Transaction::try_from(wire_tx).unwrap_err();
        match err {
            Error::Decode { field, .. } => assert_eq!(field, "outputs_data"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nested_field_path() {
        let mut wire_tx = fixtures::wire_transaction();
        wire_tx.outputs[0].lock.args = wire::Hex::from("0xabc");

        let err = domain::Transaction::try_from(wire_tx).unwrap_err();
        match err {
            Error::Decode { field, .. } => assert_eq!(field, "outputs[0].lock.args"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_absent_type_script_stays_absent() {
        let wire_tx = fixtures::wire_transaction();
        let domain_tx = domain::Transaction::try_from(wire_tx).expect("decode");
        assert!(domain_tx.outputs[0].type_.is_none());
        assert!(domain_tx.outputs[1].type_.is_some());
    }
}
