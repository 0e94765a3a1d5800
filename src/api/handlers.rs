use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::bot::Update;

use super::AppState;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Telegram webhook
///
/// Answers 200 right away; the update is handled on its own task so a slow
/// provider never makes Telegram redeliver it.
pub async fn webhook(State(state): State<AppState>, Json(update): Json<Update>) -> StatusCode {
    let update_id = update.update_id;

    match update.into_event() {
        Some(event) => {
            tracing::debug!(update_id, chat_id = event.chat_id, "Dispatching update");
            let controller = state.controller.clone();
            tokio::spawn(async move {
                controller.handle(event).await;
            });
        }
        None => tracing::debug!(update_id, "Ignoring update without a supported payload"),
    }

    StatusCode::OK
}
