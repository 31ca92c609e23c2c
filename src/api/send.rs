//! Message submission endpoint.

use axum::{extract::State, response::Redirect, Form};

use crate::errors::AppError;
use crate::models::{SendMessageRequest, MAX_MESSAGE_LEN};
use crate::AppState;

/// POST /send - Forward a message to the node, then return to the page.
pub async fn send_message(
    State(state): State<AppState>,
    Form(request): Form<SendMessageRequest>,
) -> Result<Redirect, AppError> {
    validate(&request)?;

    state.client.send_message(&request).await?;

    tracing::info!(
        target_addr = request.target_or_broadcast(),
        len = request.message.len(),
        "Message submitted to node"
    );

    Ok(Redirect::to("/"))
}

fn validate(request: &SendMessageRequest) -> Result<(), AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("Message is required".to_string()));
    }
    if request.message.len() > MAX_MESSAGE_LEN {
        return Err(AppError::Validation(format!(
            "Message exceeds {} bytes",
            MAX_MESSAGE_LEN
        )));
    }
    Ok(())
}
