//! Dashboard state owned by the application and shared with the pollers.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::{current_node_address, Message, Node};
use crate::store::{MessageStore, StoreStrategy};

/// Shared handle used by pollers and handlers.
pub type SharedDashboard = Arc<RwLock<DashboardState>>;

/// Peer selection for the chat view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PeerFilter {
    #[default]
    All,
    Peer(String),
}

impl PeerFilter {
    /// Sentinel form value meaning "no filter".
    pub const ALL: &'static str = "all";

    pub fn from_form_value(value: &str) -> Self {
        match value.trim() {
            "" | Self::ALL => PeerFilter::All,
            peer => PeerFilter::Peer(peer.to_string()),
        }
    }

    pub fn as_value(&self) -> &str {
        match self {
            PeerFilter::All => Self::ALL,
            PeerFilter::Peer(peer) => peer,
        }
    }
}

/// Everything the renderer needs, plus the bookkeeping to apply polls.
#[derive(Debug, Default)]
pub struct DashboardState {
    messages: MessageStore,
    nodes: Vec<Node>,
    current_node_addr: Option<String>,
    selected_peer: PeerFilter,
    last_message_seq: u64,
    revision: u64,
}

impl DashboardState {
    pub fn new(strategy: StoreStrategy) -> Self {
        Self {
            messages: MessageStore::new(strategy),
            ..Default::default()
        }
    }

    pub fn shared(strategy: StoreStrategy) -> SharedDashboard {
        Arc::new(RwLock::new(Self::new(strategy)))
    }

    /// Apply the response of message poll number `seq`.
    ///
    /// Under the replace strategy a response older than the last applied one
    /// is discarded and `None` is returned. Otherwise returns the number of
    /// records the store accepted.
    pub fn apply_messages(&mut self, seq: u64, records: Vec<Message>) -> Option<usize> {
        if self.messages.strategy() == StoreStrategy::Replace && seq < self.last_message_seq {
            return None;
        }
        self.last_message_seq = self.last_message_seq.max(seq);

        let added = self.messages.ingest(records);
        self.revision += 1;
        Some(added)
    }

    /// Replace the node list and re-derive the current node address.
    pub fn apply_nodes(&mut self, nodes: Vec<Node>) {
        self.current_node_addr = current_node_address(&nodes).map(str::to_string);
        self.nodes = nodes;
        self.revision += 1;
    }

    pub fn set_peer_filter(&mut self, filter: PeerFilter) {
        self.selected_peer = filter;
        self.revision += 1;
    }

    pub fn since_id(&self) -> Option<u64> {
        self.messages.since_id()
    }

    pub fn messages(&self) -> &[Message] {
        self.messages.messages()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn current_node_addr(&self) -> Option<&str> {
        self.current_node_addr.as_deref()
    }

    pub fn selected_peer(&self) -> &PeerFilter {
        &self.selected_peer
    }

    /// Bumped on every applied poll or filter change.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
