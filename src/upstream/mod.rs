//! Client for the mesh node's HTTP interface.
//!
//! Pollers only depend on [`UpdateSource`], so another update mechanism can
//! stand in for HTTP polling without touching the store or the renderer.

use std::future::Future;
use std::time::Duration;

use reqwest::{redirect, Client};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{AppError, PollError};
use crate::models::{Message, Node, SendMessageRequest};

/// Source of message and node snapshots.
pub trait UpdateSource: Send + Sync + 'static {
    /// Messages newer than `since_id`, or the full history when `None`.
    fn fetch_messages(
        &self,
        since_id: Option<u64>,
    ) -> impl Future<Output = Result<Vec<Message>, PollError>> + Send;

    fn fetch_nodes(&self) -> impl Future<Output = Result<Vec<Node>, PollError>> + Send;
}

/// HTTP client bound to one mesh node.
#[derive(Clone)]
pub struct MeshClient {
    http: Client,
    base_url: String,
}

impl MeshClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        // The node answers `POST /send` with a 303 back to its own page.
        let http = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and decode a JSON array of `T`.
    async fn get_array<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, PollError> {
        let resp = self.http.get(self.url(path)).query(query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PollError::Status(status.as_u16()));
        }

        let body = resp.bytes().await?;
        decode_array(&body)
    }

    /// Submit a message to the node. Blank targets are sent as broadcast.
    pub async fn send_message(&self, request: &SendMessageRequest) -> Result<(), AppError> {
        let form = [
            ("target", request.target_or_broadcast()),
            ("message", request.message.as_str()),
        ];

        let resp = self.http.post(self.url("/send")).form(&form).send().await?;

        let status = resp.status();
        if status.is_success() || status.is_redirection() {
            Ok(())
        } else {
            Err(AppError::Upstream(format!(
                "Node rejected message with HTTP status {}",
                status.as_u16()
            )))
        }
    }
}

impl UpdateSource for MeshClient {
    async fn fetch_messages(&self, since_id: Option<u64>) -> Result<Vec<Message>, PollError> {
        let query: Vec<(&str, String)> = since_id
            .map(|id| vec![("since_id", id.to_string())])
            .unwrap_or_default();
        self.get_array("/api/messages", &query).await
    }

    async fn fetch_nodes(&self) -> Result<Vec<Node>, PollError> {
        self.get_array("/api/nodes", &[]).await
    }
}

/// Decode a response body that must be a JSON array of records.
pub fn decode_array<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, PollError> {
    let value: Value = serde_json::from_slice(body)?;
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(_) => Err(PollError::UnexpectedShape("object")),
        Value::String(_) => Err(PollError::UnexpectedShape("string")),
        Value::Number(_) => Err(PollError::UnexpectedShape("number")),
        Value::Bool(_) => Err(PollError::UnexpectedShape("boolean")),
        Value::Null => Err(PollError::UnexpectedShape("null")),
    }
}
