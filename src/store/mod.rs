//! In-memory message store.
//!
//! Two merge strategies are supported: incremental (dedup by id, advance a
//! newest-id watermark used as the `since_id` cursor) and replace (every poll
//! swaps in the full history).

use std::collections::HashSet;
use std::str::FromStr;

use crate::errors::AppError;
use crate::models::Message;

/// How polled messages are merged into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreStrategy {
    #[default]
    Incremental,
    Replace,
}

impl StoreStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreStrategy::Incremental => "incremental",
            StoreStrategy::Replace => "replace",
        }
    }
}

impl FromStr for StoreStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "incremental" => Ok(StoreStrategy::Incremental),
            "replace" => Ok(StoreStrategy::Replace),
            other => Err(AppError::Config(format!(
                "Invalid store strategy {:?} (expected incremental or replace)",
                other
            ))),
        }
    }
}

/// Collection of message records received from the node.
#[derive(Debug, Default)]
pub struct MessageStore {
    strategy: StoreStrategy,
    messages: Vec<Message>,
    seen_ids: HashSet<u64>,
    newest_id: u64,
}

impl MessageStore {
    pub fn new(strategy: StoreStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    pub fn strategy(&self) -> StoreStrategy {
        self.strategy
    }

    /// Merge a polled batch. Returns the number of records added.
    pub fn ingest(&mut self, records: Vec<Message>) -> usize {
        match self.strategy {
            StoreStrategy::Incremental => {
                let mut added = 0;
                for msg in records {
                    if !self.seen_ids.insert(msg.id) {
                        continue;
                    }
                    self.newest_id = self.newest_id.max(msg.id);
                    self.messages.push(msg);
                    added += 1;
                }
                added
            }
            StoreStrategy::Replace => {
                self.newest_id = records.iter().map(|m| m.id).max().unwrap_or(0);
                self.seen_ids = records.iter().map(|m| m.id).collect();
                self.messages = records;
                self.messages.len()
            }
        }
    }

    /// Cursor for the next incremental poll. `None` requests the full history.
    pub fn since_id(&self) -> Option<u64> {
        match self.strategy {
            StoreStrategy::Incremental if self.newest_id > 0 => Some(self.newest_id),
            _ => None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}
