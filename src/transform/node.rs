//! Peer and local node records.

// ============================================================================
// Imports
// ============================================================================

use crate::error::{DecodeResultExt, Error, Result};
use crate::schema::{domain, wire};

use super::hex::{decode_uint, encode_uint};
use super::{map_into, try_map};

// ============================================================================
// Peers
// ============================================================================

impl TryFrom<wire::NodeAddress> for domain::NodeAddress {
    type Error = Error;

    fn try_from(value: wire::NodeAddress) -> Result<Self> {
        Ok(Self {
            address: value.address,
            score: decode_uint(&value.score).within("score")?,
        })
    }
}

impl From<domain::NodeAddress> for wire::NodeAddress {
    fn from(value: domain::NodeAddress) -> Self {
        Self {
            address: value.address,
            score: encode_uint(value.score),
        }
    }
}

impl TryFrom<wire::RemoteNodeProtocol> for domain::RemoteNodeProtocol {
    type Error = Error;

    fn try_from(value: wire::RemoteNodeProtocol) -> Result<Self> {
        Ok(Self {
            id: decode_uint(&value.id).within("id")?,
            version: value.version,
        })
    }
}

impl From<domain::RemoteNodeProtocol> for wire::RemoteNodeProtocol {
    fn from(value: domain::RemoteNodeProtocol) -> Self {
        Self {
            id: encode_uint(value.id),
            version: value.version,
        }
    }
}

impl TryFrom<wire::PeerSyncState> for domain::PeerSyncState {
    type Error = Error;

    fn try_from(value: wire::PeerSyncState) -> Result<Self> {
        Ok(Self {
            requested_best_known_header: value
                .requested_best_known_header
                .map(domain::Header::try_from)
                .transpose()
                .within("requested_best_known_header")?,
            proved_best_known_header: value
                .proved_best_known_header
                .map(domain::Header::try_from)
                .transpose()
                .within("proved_best_known_header")?,
        })
    }
}

impl From<domain::PeerSyncState> for wire::PeerSyncState {
    fn from(value: domain::PeerSyncState) -> Self {
        Self {
            requested_best_known_header: value.requested_best_known_header.map(Into::into),
            proved_best_known_header: value.proved_best_known_header.map(Into::into),
        }
    }
}

impl TryFrom<wire::RemoteNode> for domain::RemoteNode {
    type Error = Error;

    fn try_from(value: wire::RemoteNode) -> Result<Self> {
        Ok(Self {
            version: value.version,
            node_id: value.node_id,
            addresses: try_map(value.addresses, domain::NodeAddress::try_from)
                .within("addresses")?,
            connected_duration: decode_uint(&value.connected_duration)
                .within("connected_duration")?,
            sync_state: value
                .sync_state
                .map(domain::PeerSyncState::try_from)
                .transpose()
                .within("sync_state")?,
            protocols: try_map(value.protocols, domain::RemoteNodeProtocol::try_from)
                .within("protocols")?,
        })
    }
}

impl From<domain::RemoteNode> for wire::RemoteNode {
    fn from(value: domain::RemoteNode) -> Self {
        Self {
            version: value.version,
            node_id: value.node_id,
            addresses: map_into(value.addresses),
            connected_duration: encode_uint(value.connected_duration),
            sync_state: value.sync_state.map(Into::into),
            protocols: map_into(value.protocols),
        }
    }
}

// ============================================================================
// Local Node
// ============================================================================

impl TryFrom<wire::LocalNodeProtocol> for domain::LocalNodeProtocol {
    type Error = Error;

    fn try_from(value: wire::LocalNodeProtocol) -> Result<Self> {
        Ok(Self {
            id: decode_uint(&value.id).within("id")?,
            name: value.name,
            support_versions: value.support_versions,
        })
    }
}

impl From<domain::LocalNodeProtocol> for wire::LocalNodeProtocol {
    fn from(value: domain::LocalNodeProtocol) -> Self {
        Self {
            id: encode_uint(value.id),
            name: value.name,
            support_versions: value.support_versions,
        }
    }
}

impl TryFrom<wire::LocalNode> for domain::LocalNode {
    type Error = Error;

    fn try_from(value: wire::LocalNode) -> Result<Self> {
        Ok(Self {
            version: value.version,
            node_id: value.node_id,
            active: value.active,
            addresses: try_map(value.addresses, domain::NodeAddress::try_from)
                .within("addresses")?,
            protocols: try_map(value.protocols, domain::LocalNodeProtocol::try_from)
                .within("protocols")?,
            connections: decode_uint(&value.connections).within("connections")?,
        })
    }
}

impl From<domain::LocalNode> for wire::LocalNode {
    fn from(value: domain::LocalNode) -> Self {
        Self {
            version: value.version,
            node_id: value.node_id,
            active: value.active,
            addresses: map_into(value.addresses),
            protocols: map_into(value.protocols),
            connections: encode_uint(value.connections),
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
    fn test_remote_node_from_page() {
        let node: domain::RemoteNode = serde_json::from_value(json!({
            "version": "0.118.0",
            "nodeId": "QmSRcPqUn4aQrKHXyCDjGn2qBVf43tWBDS2Wj9QDUZXtZp",
            "addresses": [{"address": "/ip4/18.185.102.19/tcp/8115", "score": {"$bigint": "0x64"}}],
            "connectedDuration": {"$bigint": "0x2710"},
            "syncState": {"provedBestKnownHeader": fixtures::page_header()},
            "protocols": [{"id": {"$bigint": "0x78"}, "version": "3"}],
        }))
        .expect("parse");

        let wire_node = wire::RemoteNode::from(node.clone());
        let value = serde_json::to_value(&wire_node).expect("serialize");
        assert_eq!(value["connected_duration"], json!("0x2710"));
        assert_eq!(value["addresses"][0]["score"], json!("0x64"));
        assert_eq!(value["protocols"][0]["id"], json!("0x78"));
        assert!(value["sync_state"].get("requested_best_known_header").is_none());
        assert!(value["sync_state"]["proved_best_known_header"]["dao"].is_string());

        assert_eq!(domain::RemoteNode::try_from(wire_node).expect("decode"), node);
    }

    #[test]
    fn test_local_node_round_trip() {
        let wire_node: wire::LocalNode = serde_json::from_value(json!({
            "version": "0.3.0",
            "node_id": "QmLocal",
            "active": true,
            "addresses": [],
            "protocols": [{"id": "0x0", "name": "/ckb/syn", "support_versions": ["2", "3"]}],
            "connections": "0x4",
        }))
        .expect("parse");

        let domain_node = domain::LocalNode::try_from(wire_node.clone()).expect("decode");
        assert_eq!(domain_node.connections, 4);
        let value = serde_json::to_value(&domain_node).expect("serialize");
        assert_eq!(value["protocols"][0]["supportVersions"], json!(["2", "3"]));

        assert_eq!(wire::LocalNode::from(domain_node), wire_node);
    }

    #[test]
    fn test_bad_score_path() {
        let wire_node = wire::LocalNode {
            version: String::new(),
            node_id: String::new(),
            active: false,
            addresses: vec![wire::NodeAddress {
                address: "/ip4/127.0.0.1".to_string(),
                score: wire::Hex::from("64"),
            }],
            protocols: Vec::new(),
            connections: wire::Hex::from("0x0"),
        };
        match domain::LocalNode::try_from(wire_node).unwrap_err() {
            Error::Decode { field, .. } => assert_eq!(field, "addresses[0].score"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
