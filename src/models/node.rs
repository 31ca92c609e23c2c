//! Node model matching the node's `/api/nodes` records.

use serde::{Deserialize, Serialize};

use super::{de_address, de_flag, de_or_default};

/// Reachability of a peer as tracked by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Alive,
    Dead,
    Unknown,
}

impl NodeStatus {
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(0) => NodeStatus::Alive,
            Some(1) => NodeStatus::Dead,
            _ => NodeStatus::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NodeStatus::Alive => "Alive",
            NodeStatus::Dead => "Dead",
            NodeStatus::Unknown => "Unknown",
        }
    }
}

/// A mesh peer with connectivity metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(deserialize_with = "de_address")]
    pub address: String,
    #[serde(default, deserialize_with = "de_or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "de_or_default")]
    pub messages: u64,
    #[serde(default)]
    pub avg_rssi: Option<f64>,
    #[serde(default)]
    pub avg_snr: Option<f64>,
    #[serde(default)]
    pub status: Option<i64>,
    /// Epoch seconds of the last message heard from this peer
    #[serde(default)]
    pub last_connection: Option<f64>,
    /// Marks the node this dashboard is attached to
    #[serde(default, deserialize_with = "de_flag")]
    pub current_node: bool,
}

impl Node {
    pub fn status(&self) -> NodeStatus {
        NodeStatus::from_code(self.status)
    }
}

/// Address of the node flagged as current, if any.
pub fn current_node_address(nodes: &[Node]) -> Option<&str> {
    nodes
        .iter()
        .find(|n| n.current_node)
        .map(|n| n.address.as_str())
}
