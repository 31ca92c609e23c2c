//! Dashboard HTTP surface.
//!
//! Serves the rendered page, its refresh fragments, the JSON view-model and
//! the two form endpoints (peer filter, message submission).

mod dashboard;
mod send;

pub use dashboard::*;
pub use send::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision: u64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, revision: u64) -> Self {
        Self {
            success: true,
            data,
            revision,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, revision: u64) -> ApiResult<T> {
    Ok(ApiResponse::new(data, revision))
}
