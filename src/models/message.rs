//! Message model matching the node's `/api/messages` records.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{de_address, de_or_default};

/// Mesh message type as carried in `message_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum MessageType {
    Broadcast,
    Normal,
    Ack,
    Critical,
    Maintenance,
    Ping,
    Command,
    Other(i64),
}

impl MessageType {
    pub fn code(&self) -> i64 {
        match self {
            MessageType::Broadcast => 1,
            MessageType::Normal => 2,
            MessageType::Ack => 3,
            MessageType::Critical => 4,
            MessageType::Maintenance => 5,
            MessageType::Ping => 6,
            MessageType::Command => 7,
            MessageType::Other(code) => *code,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MessageType::Broadcast => "Broadcast",
            MessageType::Normal => "Normal",
            MessageType::Ack => "Ack",
            MessageType::Critical => "Critical",
            MessageType::Maintenance => "Maintenance",
            MessageType::Ping => "Ping",
            MessageType::Command => "Command",
            MessageType::Other(_) => "Unknown",
        }
    }

    /// Conversational traffic shown in the chat view.
    pub fn is_chat(&self) -> bool {
        matches!(
            self,
            MessageType::Broadcast | MessageType::Normal | MessageType::Critical
        )
    }

    /// Protocol/diagnostic traffic shown in the system table.
    pub fn is_system(&self) -> bool {
        matches!(
            self,
            MessageType::Ack | MessageType::Maintenance | MessageType::Ping | MessageType::Command
        )
    }
}

impl From<i64> for MessageType {
    fn from(code: i64) -> Self {
        match code {
            1 => MessageType::Broadcast,
            2 => MessageType::Normal,
            3 => MessageType::Ack,
            4 => MessageType::Critical,
            5 => MessageType::Maintenance,
            6 => MessageType::Ping,
            7 => MessageType::Command,
            other => MessageType::Other(other),
        }
    }
}

impl From<MessageType> for i64 {
    fn from(kind: MessageType) -> Self {
        kind.code()
    }
}

/// Message timestamp: epoch seconds or an ISO-8601 string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Epoch(i64),
    Fractional(f64),
    Text(String),
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::Epoch(0)
    }
}

impl Timestamp {
    /// Normalize to epoch seconds. Unparseable strings resolve to 0.
    pub fn as_seconds(&self) -> i64 {
        match self {
            Timestamp::Epoch(secs) => *secs,
            Timestamp::Fractional(secs) if secs.is_finite() => secs.trunc() as i64,
            Timestamp::Fractional(_) => 0,
            Timestamp::Text(text) => parse_iso8601(text.trim()).unwrap_or(0),
        }
    }
}

/// ISO-8601 text to epoch seconds. Forms without an offset are read as UTC,
/// and a bare date means midnight.
fn parse_iso8601(text: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp())
}

/// A message record as reported by the node. Diagnostic fields are kept
/// as raw JSON values and only ever displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub message_type: MessageType,
    #[serde(default, deserialize_with = "de_address")]
    pub origin: String,
    #[serde(default, deserialize_with = "de_address")]
    pub source: String,
    #[serde(default, deserialize_with = "de_address")]
    pub destination: String,
    #[serde(default, deserialize_with = "de_or_default")]
    pub content: String,
    #[serde(default, deserialize_with = "de_or_default")]
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rssi: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snr: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_status: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack_status: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack_for: Option<Value>,
}

impl Message {
    pub fn timestamp_seconds(&self) -> i64 {
        self.timestamp.as_seconds()
    }
}

/// Longest message body the node accepts.
pub const MAX_MESSAGE_LEN: usize = 249;

/// Form body for submitting a new message (`POST /send`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl SendMessageRequest {
    /// Broadcast sentinel used when no target is chosen.
    pub const BROADCAST_TARGET: &'static str = "0";

    /// The target address, defaulting to broadcast when left blank.
    pub fn target_or_broadcast(&self) -> &str {
        match self.target.as_deref().map(str::trim) {
            Some(target) if !target.is_empty() => target,
            _ => Self::BROADCAST_TARGET,
        }
    }
}
