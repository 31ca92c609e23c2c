//! Page, fragment and view-model endpoints.

use std::time::Duration;

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse, Redirect},
    Form, Json,
};
use chrono::Utc;
use serde::Deserialize;

use super::{success, ApiResult};
use crate::render::{self, html, DashboardView};
use crate::state::PeerFilter;
use crate::AppState;

/// Render the current state as of now.
async fn current_view(state: &AppState) -> DashboardView {
    let dashboard = state.dashboard.read().await;
    render::render(&dashboard, Utc::now().timestamp())
}

/// Page refresh period in milliseconds, saturating on overflow.
fn refresh_millis(every: Duration) -> u64 {
    u64::try_from(every.as_millis()).unwrap_or(u64::MAX)
}

/// GET / - Full dashboard page.
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let view = current_view(&state).await;
    let refresh_ms = refresh_millis(state.config.messages_poll_interval);
    (
        [(header::CACHE_CONTROL, "no-store")],
        Html(html::page(&view, refresh_ms)),
    )
}

/// GET /fragments - Pre-rendered HTML fragments keyed by element.
pub async fn fragments(State(state): State<AppState>) -> impl IntoResponse {
    let view = current_view(&state).await;
    (
        [(header::CACHE_CONTROL, "no-store")],
        Json(html::fragments(&view)),
    )
}

/// GET /api/view - The view-model as JSON.
pub async fn get_view(State(state): State<AppState>) -> ApiResult<DashboardView> {
    let view = current_view(&state).await;
    let revision = view.revision;
    success(view, revision)
}

/// Form body for `POST /filter`.
#[derive(Debug, Deserialize)]
pub struct FilterForm {
    #[serde(default)]
    pub peer: String,
}

/// POST /filter - Select the chat peer filter, then return to the page.
pub async fn set_filter(State(state): State<AppState>, Form(form): Form<FilterForm>) -> Redirect {
    let filter = PeerFilter::from_form_value(&form.peer);
    tracing::debug!(peer = filter.as_value(), "Peer filter changed");
    state.dashboard.write().await.set_peer_filter(filter);
    Redirect::to("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_millis_saturates() {
        assert_eq!(refresh_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(refresh_millis(Duration::MAX), u64::MAX);
    }
}
