//! Error handling module for the mesh dashboard.
//!
//! Provides the poll failure taxonomy and the handler error type with mapping
//! to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
}

/// Why a single poll of an upstream endpoint produced no usable data.
///
/// Every variant is handled the same way: log and keep the last good state.
#[derive(Debug)]
pub enum PollError {
    /// Connection refused, timeout, reset, etc.
    Transport(String),
    /// Non-success HTTP status
    Status(u16),
    /// Body was not valid JSON, or a record did not decode
    MalformedJson(String),
    /// Body was valid JSON but not an array
    UnexpectedShape(&'static str),
}

impl std::fmt::Display for PollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollError::Transport(msg) => write!(f, "transport error: {}", msg),
            PollError::Status(status) => write!(f, "unexpected HTTP status {}", status),
            PollError::MalformedJson(msg) => write!(f, "malformed JSON body: {}", msg),
            PollError::UnexpectedShape(kind) => {
                write!(f, "expected a JSON array, got {}", kind)
            }
        }
    }
}

impl std::error::Error for PollError {}

impl From<reqwest::Error> for PollError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => PollError::Status(status.as_u16()),
            None => PollError::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for PollError {
    fn from(err: serde_json::Error) -> Self {
        PollError::MalformedJson(err.to_string())
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Rejected form input
    Validation(String),
    /// The mesh node could not be reached or refused the request
    Upstream(String),
    /// Invalid configuration at startup
    Config(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Upstream(_) => codes::UPSTREAM_ERROR,
            AppError::Config(_) => codes::CONFIG_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Upstream(msg) => msg.clone(),
            AppError::Config(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("Upstream request error: {:?}", err);
        AppError::Upstream(format!("Upstream request failed: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

/// Error response envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse::new(&self))).into_response()
    }
}
