//! Projection of dashboard state into view-models.
//!
//! Rendering is pure: the same state and clock always give the same views.
//! Strings in the view-models are raw; escaping is the adapter's job.

pub mod format;
pub mod html;

use serde::Serialize;

use crate::models::{Message, Node, SendMessageRequest};
use crate::state::{DashboardState, PeerFilter};
use format::{display_value, format_ago, format_metric, format_time_short};

/// How a message relates to the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    FromMe,
    ToMe,
    Neither,
}

impl Direction {
    pub fn css_class(&self) -> &'static str {
        match self {
            Direction::FromMe => "sys-from-me",
            Direction::ToMe => "sys-to-me",
            Direction::Neither => "sys-other",
        }
    }
}

/// Classify a message against the current node address.
pub fn classify(msg: &Message, current: Option<&str>) -> Direction {
    match current {
        Some(me) if msg.origin == me => Direction::FromMe,
        Some(me) if msg.destination == me => Direction::ToMe,
        _ => Direction::Neither,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatEntry {
    pub id: u64,
    pub type_code: i64,
    pub type_label: &'static str,
    pub from_me: bool,
    pub source: String,
    pub destination: String,
    pub content: String,
    pub time: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatView {
    pub entries: Vec<ChatEntry>,
}

impl ChatView {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemRow {
    pub direction: Direction,
    pub time: String,
    pub id: u64,
    pub type_label: &'static str,
    pub origin: String,
    pub source: String,
    pub destination: String,
    pub steps: String,
    pub length: String,
    pub rssi: String,
    pub snr: String,
    pub stage: String,
    pub transfer_status: String,
    pub ack_status: String,
    pub ack_for: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SystemView {
    pub rows: Vec<SystemRow>,
}

impl SystemView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeRow {
    pub address: String,
    pub name: String,
    pub messages: u64,
    pub avg_rssi: String,
    pub avg_snr: String,
    pub status: &'static str,
    pub last_seen: String,
    pub this_node: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeView {
    pub rows: Vec<NodeRow>,
    pub target_options: Vec<SelectOption>,
    pub peer_options: Vec<SelectOption>,
}

impl NodeView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// All three views plus the context they were rendered with.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub revision: u64,
    pub current_node: Option<String>,
    pub selected_peer: String,
    pub chat: ChatView,
    pub system: SystemView,
    pub nodes: NodeView,
}

/// Render every view from the current state. `now` is epoch seconds.
pub fn render(state: &DashboardState, now: i64) -> DashboardView {
    let current = state.current_node_addr();
    DashboardView {
        revision: state.revision(),
        current_node: current.map(str::to_string),
        selected_peer: state.selected_peer().as_value().to_string(),
        chat: chat_view(state.messages(), current, state.selected_peer()),
        system: system_view(state.messages(), current),
        nodes: node_view(state.nodes(), state.selected_peer(), now),
    }
}

/// Conversational messages, oldest first.
pub fn chat_view(messages: &[Message], current: Option<&str>, peer: &PeerFilter) -> ChatView {
    let mut chats: Vec<&Message> = messages
        .iter()
        .filter(|m| m.message_type.is_chat())
        .filter(|m| match (peer, current) {
            (PeerFilter::Peer(peer), Some(me)) => {
                (m.source == me && m.destination == *peer)
                    || (m.source == *peer && m.destination == me)
            }
            // Without a known current node the peer filter has nothing to pair with.
            _ => true,
        })
        .collect();

    chats.sort_by_key(|m| m.timestamp_seconds());

    let entries = chats
        .into_iter()
        .map(|m| ChatEntry {
            id: m.id,
            type_code: m.message_type.code(),
            type_label: m.message_type.label(),
            from_me: classify(m, current) == Direction::FromMe,
            source: m.source.clone(),
            destination: m.destination.clone(),
            content: m.content.clone(),
            time: format_time_short(m.timestamp_seconds()),
        })
        .collect();

    ChatView { entries }
}

/// Protocol and diagnostic messages, newest first.
pub fn system_view(messages: &[Message], current: Option<&str>) -> SystemView {
    let mut system: Vec<&Message> = messages
        .iter()
        .filter(|m| m.message_type.is_system())
        .collect();

    system.sort_by_key(|m| std::cmp::Reverse(m.timestamp_seconds()));

    let rows = system
        .into_iter()
        .map(|m| SystemRow {
            direction: classify(m, current),
            time: format_time_short(m.timestamp_seconds()),
            id: m.id,
            type_label: m.message_type.label(),
            origin: m.origin.clone(),
            source: m.source.clone(),
            destination: m.destination.clone(),
            steps: display_value(m.steps.as_ref()),
            length: display_value(m.length.as_ref()),
            rssi: display_value(m.rssi.as_ref()),
            snr: display_value(m.snr.as_ref()),
            stage: display_value(m.stage.as_ref()),
            transfer_status: display_value(m.transfer_status.as_ref()),
            ack_status: display_value(m.ack_status.as_ref()),
            ack_for: display_value(m.ack_for.as_ref()),
            content: m.content.clone(),
        })
        .collect();

    SystemView { rows }
}

/// Node table and the two selection controls built from it.
pub fn node_view(nodes: &[Node], peer: &PeerFilter, now: i64) -> NodeView {
    let mut view = NodeView {
        rows: Vec::with_capacity(nodes.len()),
        target_options: vec![SelectOption {
            value: SendMessageRequest::BROADCAST_TARGET.to_string(),
            label: "Broadcast".to_string(),
            selected: true,
        }],
        peer_options: vec![SelectOption {
            value: PeerFilter::ALL.to_string(),
            label: "All".to_string(),
            selected: *peer == PeerFilter::All,
        }],
    };

    for node in nodes {
        let last_seen = match node.last_connection {
            Some(at) if at.is_finite() => format_ago(now - at.trunc() as i64),
            _ => "-".to_string(),
        };

        view.rows.push(NodeRow {
            address: node.address.clone(),
            name: node.name.clone(),
            messages: node.messages,
            avg_rssi: format_metric(node.avg_rssi),
            avg_snr: format_metric(node.avg_snr),
            status: node.status().label(),
            last_seen,
            this_node: node.current_node,
        });

        let label = format!("{} — {}", node.name, node.address);
        view.target_options.push(SelectOption {
            value: node.address.clone(),
            label: label.clone(),
            selected: false,
        });
        view.peer_options.push(SelectOption {
            value: node.address.clone(),
            label,
            selected: matches!(peer, PeerFilter::Peer(p) if *p == node.address),
        });
    }

    view
}
