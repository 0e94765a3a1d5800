use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;
use crate::middleware::{make_span, verify_webhook_secret};

/// Creates the router: a health probe and the Telegram webhook
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/webhook",
            post(handlers::webhook).route_layer(middleware::from_fn_with_state(
                state.clone(),
                verify_webhook_secret,
            )),
        )
        .layer(TraceLayer::new_for_http().make_span_with(make_span))
        .with_state(state)
}
