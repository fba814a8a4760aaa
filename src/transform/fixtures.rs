//! Sample records shared by tests.

use serde_json::{Value, json};

use crate::schema::domain::{self, Dao, Epoch};
use crate::schema::wire::{self, Hex};
use crate::schema::{Bytes, H256};

pub fn hash_hex(byte: u8) -> String {
    format!("0x{}", hex::encode([byte; 32]))
}

pub fn wire_script() -> wire::Script {
    wire::Script {
        code_hash: Hex::from(hash_hex(0x9b)),
        hash_type: wire::HashType::Type,
        args: Hex::from("0x36c329ed630d6ce750712a477543672adab57f4c"),
    }
}

pub fn wire_transaction() -> wire::Transaction {
    let lock = wire_script();
    let type_script = wire::Script {
        code_hash: Hex::from(hash_hex(0x82)),
        hash_type: wire::HashType::Data1,
        args: Hex::from("0x"),
    };

    wire::Transaction {
        version: Hex::from("0x0"),
        cell_deps: vec![wire::CellDep {
            out_point: wire::OutPoint {
                tx_hash: Hex::from(hash_hex(0x71)),
                index: Hex::from("0x0"),
            },
            dep_type: wire::DepType::DepGroup,
        }],
        header_deps: vec![Hex::from(hash_hex(0x01))],
        inputs: vec![wire::CellInput {
            previous_output: wire::OutPoint {
                tx_hash: Hex::from(hash_hex(0xa0)),
                index: Hex::from("0x1"),
            },
            since: Hex::from("0x0"),
        }],
        outputs: vec![
            wire::CellOutput {
                capacity: Hex::from("0x174876e800"),
                lock: lock.clone(),
                type_: None,
            },
            wire::CellOutput {
                capacity: Hex::from("0x2540be400"),
                lock,
                type_: Some(type_script),
            },
        ],
        outputs_data: vec![Hex::from("0x"), Hex::from("0x1234")],
        witnesses: vec![Hex::from("0x5500000010000000550000005500000041000000")],
        hash: None,
    }
}

pub fn domain_script() -> domain::Script {
    domain::Script {
        code_hash: H256::new([0x9b; 32]),
        hash_type: domain::HashType::Type,
        args: Bytes::new(vec![0xab; 20]),
    }
}

pub fn domain_transaction() -> domain::Transaction {
    domain::Transaction {
        version: 0,
        cell_deps: vec![domain::CellDep {
            out_point: domain::OutPoint {
                tx_hash: H256::new([0x71; 32]),
                index: 0,
            },
            dep_type: domain::DepType::Code,
        }],
        header_deps: Vec::new(),
        inputs: vec![domain::CellInput {
            previous_output: domain::OutPoint {
                tx_hash: H256::new([0xa0; 32]),
                index: 3,
            },
            since: 0x2000_0000_0000_0010,
        }],
        outputs: vec![domain::CellOutput {
            capacity: 100_000_000_000,
            lock: domain_script(),
            type_: None,
        }],
        outputs_data: vec![Bytes::default()],
        witnesses: vec![Bytes::new(vec![0x10, 0x00])],
    }
}

pub fn domain_header() -> domain::Header {
    domain::Header {
        compact_target: 0x1d08_0000,
        dao: Dao {
            c: 1,
            ar: 10_000_000_000_000_000,
            s: 3,
            u: u64::MAX,
        },
        epoch: Epoch::new(0x123, 0x45, 0x708).unwrap_or_default(),
        extra_hash: H256::default(),
        hash: H256::new([0x5a; 32]),
        nonce: 0x7d8b_0000_0000_0000_0000_0000_0000_0001,
        number: 0x10_0000,
        parent_hash: H256::new([0x4e; 32]),
        proposals_hash: H256::default(),
        timestamp: 1_700_000_000_000,
        transactions_root: H256::new([0x33; 32]),
        version: 0,
    }
}

pub fn wire_header() -> wire::Header {
    let packed_epoch: u64 = 0x123 | (0x45 << 24) | (0x708 << 40);
    wire::Header {
        compact_target: Hex::from("0x1e015555"),
        dao: Hex::from(
            "0x0100000000000000020000000000000003000000000000000400000000000000",
        ),
        epoch: Hex::from(format!("{packed_epoch:#x}")),
        extra_hash: Hex::from(hash_hex(0x00)),
        hash: Hex::from(hash_hex(0x92)),
        nonce: Hex::from("0x0"),
        number: Hex::from("0x0"),
        parent_hash: Hex::from(hash_hex(0x00)),
        proposals_hash: Hex::from(hash_hex(0x00)),
        timestamp: Hex::from("0x16e70e6985c"),
        transactions_root: Hex::from(hash_hex(0x8a)),
        version: Hex::from("0x0"),
    }
}

/// `domain_transaction` as the page would return it.
pub fn page_transaction() -> Value {
    json!({
        "version": {"$bigint": "0x0"},
        "cellDeps": [{
            "outPoint": {"txHash": hash_hex(0x71), "index": {"$bigint": "0x0"}},
            "depType": "code",
        }],
        "headerDeps": [],
        "inputs": [{
            "previousOutput": {"txHash": hash_hex(0xa0), "index": "0x3"},
            "since": {"$bigint": "0x2000000000000010"},
        }],
        "outputs": [{
            "capacity": {"$bigint": "0x174876e800"},
            "lock": {
                "codeHash": hash_hex(0x9b),
                "hashType": "type",
                "args": format!("0x{}", "ab".repeat(20)),
            },
        }],
        "outputsData": ["0x"],
        "witnesses": ["0x1000"],
    })
}

/// `domain_header` as the page would return it.
pub fn page_header() -> Value {
    serde_json::to_value(domain_header()).unwrap_or(Value::Null)
}
