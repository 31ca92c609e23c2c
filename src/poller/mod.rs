//! Timer-driven polling of the mesh node.
//!
//! Each endpoint has its own interval task. Every tick spawns its fetch, so
//! a slow request never delays the next tick and responses may land out of
//! order. Failures are logged and the last good state is kept.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::state::SharedDashboard;
use crate::upstream::UpdateSource;

/// Handles of the two running poll loops.
pub struct Pollers {
    pub messages: JoinHandle<()>,
    pub nodes: JoinHandle<()>,
}

impl Pollers {
    pub fn abort(&self) {
        self.messages.abort();
        self.nodes.abort();
    }
}

/// Start both poll loops. The first tick of each fires immediately.
pub fn spawn_pollers<S: UpdateSource>(
    source: Arc<S>,
    dashboard: SharedDashboard,
    messages_every: Duration,
    nodes_every: Duration,
) -> Pollers {
    let message_seq = Arc::new(AtomicU64::new(0));

    let messages = {
        let source = source.clone();
        let dashboard = dashboard.clone();
        tokio::spawn(async move {
            let mut ticker = interval(messages_every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let seq = message_seq.fetch_add(1, Ordering::Relaxed) + 1;
                tokio::spawn(poll_messages(source.clone(), dashboard.clone(), seq));
            }
        })
    };

    let nodes = tokio::spawn(async move {
        let mut ticker = interval(nodes_every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            tokio::spawn(poll_nodes(source.clone(), dashboard.clone()));
        }
    });

    tracing::info!(
        "Polling messages every {:?} and nodes every {:?}",
        messages_every,
        nodes_every
    );

    Pollers { messages, nodes }
}

/// One messages poll. `seq` orders responses for the replace strategy.
pub async fn poll_messages<S: UpdateSource>(source: Arc<S>, dashboard: SharedDashboard, seq: u64) {
    let since_id = dashboard.read().await.since_id();

    match source.fetch_messages(since_id).await {
        Ok(records) => {
            let received = records.len();
            let mut state = dashboard.write().await;
            match state.apply_messages(seq, records) {
                Some(added) => tracing::debug!(
                    seq,
                    ?since_id,
                    received,
                    added,
                    "Applied messages poll"
                ),
                None => tracing::debug!(seq, "Discarded stale messages poll"),
            }
        }
        Err(e) => tracing::warn!("Failed to poll messages: {}", e),
    }
}

/// One nodes poll.
pub async fn poll_nodes<S: UpdateSource>(source: Arc<S>, dashboard: SharedDashboard) {
    match source.fetch_nodes().await {
        Ok(nodes) => {
            let mut state = dashboard.write().await;
            state.apply_nodes(nodes);
            tracing::debug!(
                count = state.nodes().len(),
                current = ?state.current_node_addr(),
                "Applied nodes poll"
            );
        }
        Err(e) => tracing::warn!("Failed to poll nodes: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serde_json::json;

    use crate::errors::PollError;
    use crate::models::{Message, Node};
    use crate::state::DashboardState;
    use crate::store::StoreStrategy;
    use crate::upstream::decode_array;

    /// Scripted source: pops one canned response per call and records cursors.
    #[derive(Default)]
    struct ScriptedSource {
        messages: Mutex<Vec<Result<Vec<Message>, PollError>>>,
        nodes: Mutex<Vec<Result<Vec<Node>, PollError>>>,
        cursors: Mutex<Vec<Option<u64>>>,
    }

    impl UpdateSource for ScriptedSource {
        async fn fetch_messages(&self, since_id: Option<u64>) -> Result<Vec<Message>, PollError> {
            self.cursors.lock().unwrap().push(since_id);
            self.messages
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(PollError::Transport("script exhausted".into())))
        }

        async fn fetch_nodes(&self) -> Result<Vec<Node>, PollError> {
            self.nodes
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(PollError::Transport("script exhausted".into())))
        }
    }

    fn messages(ids: &[u64]) -> Vec<Message> {
        ids.iter()
            .map(|id| {
                serde_json::from_value(json!({
                    "id": id, "message_type": 2, "origin": "A", "source": "A",
                    "destination": "B", "content": "hi", "timestamp": 1700000000
                }))
                .unwrap()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_poll_messages_advances_cursor() {
        let source = Arc::new(ScriptedSource::default());
        // Responses are popped from the back.
        *source.messages.lock().unwrap() = vec![Ok(messages(&[3, 4])), Ok(messages(&[1, 2]))];
        let dashboard = DashboardState::shared(StoreStrategy::Incremental);

        poll_messages(source.clone(), dashboard.clone(), 1).await;
        poll_messages(source.clone(), dashboard.clone(), 2).await;

        assert_eq!(*source.cursors.lock().unwrap(), vec![None, Some(2)]);
        assert_eq!(dashboard.read().await.messages().len(), 4);
        assert_eq!(dashboard.read().await.since_id(), Some(4));
    }

    #[tokio::test]
    async fn test_poll_failure_keeps_last_good_state() {
        let source = Arc::new(ScriptedSource::default());
        *source.messages.lock().unwrap() = vec![
            Err(PollError::UnexpectedShape("object")),
            Err(PollError::MalformedJson("eof".into())),
            Err(PollError::Status(500)),
            Ok(messages(&[1, 2])),
        ];
        let dashboard = DashboardState::shared(StoreStrategy::Incremental);

        for seq in 1..=4 {
            poll_messages(source.clone(), dashboard.clone(), seq).await;
        }

        let state = dashboard.read().await;
        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.since_id(), Some(2));
    }

    #[tokio::test]
    async fn test_null_content_record_is_stored() {
        let body = br#"[
            {"id": 1, "message_type": 2, "source": "A", "destination": "B",
             "content": "hi", "timestamp": 1700000000},
            {"id": 2, "message_type": 2, "source": "A", "destination": "B",
             "content": null, "timestamp": null}
        ]"#;
        let batch: Vec<Message> = decode_array(body).unwrap();

        let source = Arc::new(ScriptedSource::default());
        *source.messages.lock().unwrap() = vec![Ok(Vec::new()), Ok(batch)];
        let dashboard = DashboardState::shared(StoreStrategy::Incremental);

        poll_messages(source.clone(), dashboard.clone(), 1).await;
        poll_messages(source.clone(), dashboard.clone(), 2).await;

        assert_eq!(*source.cursors.lock().unwrap(), vec![None, Some(2)]);
        let state = dashboard.read().await;
        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.messages()[1].content, "");
    }

    #[tokio::test]
    async fn test_poll_nodes_failure_keeps_nodes() {
        let source = Arc::new(ScriptedSource::default());
        let nodes: Vec<Node> =
            serde_json::from_value(json!([{ "address": "A", "current_node": 1 }])).unwrap();
        *source.nodes.lock().unwrap() =
            vec![Err(PollError::Transport("connection refused".into())), Ok(nodes)];
        let dashboard = DashboardState::shared(StoreStrategy::Incremental);

        poll_nodes(source.clone(), dashboard.clone()).await;
        poll_nodes(source.clone(), dashboard.clone()).await;

        let state = dashboard.read().await;
        assert_eq!(state.nodes().len(), 1);
        assert_eq!(state.current_node_addr(), Some("A"));
    }

    #[tokio::test]
    async fn test_spawned_pollers_fill_state() {
        let source = Arc::new(ScriptedSource::default());
        *source.messages.lock().unwrap() = vec![Ok(messages(&[1]))];
        *source.nodes.lock().unwrap() = vec![Ok(Vec::new())];
        let dashboard = DashboardState::shared(StoreStrategy::Incremental);

        let pollers = spawn_pollers(
            source,
            dashboard.clone(),
            Duration::from_millis(20),
            Duration::from_millis(20),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
        pollers.abort();

        // Later ticks hit an exhausted script and must not disturb the result.
        assert_eq!(dashboard.read().await.messages().len(), 1);
    }
}
