use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{api::AppState, error::AppError};

/// Header Telegram fills with the secret registered alongside the webhook
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Rejects webhook calls whose secret header does not match the configured one.
///
/// When no secret is configured every request is let through.
pub async fn verify_webhook_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(expected) = state.webhook_secret.as_deref() {
        let provided = request
            .headers()
            .get(SECRET_TOKEN_HEADER)
            .and_then(|h| h.to_str().ok());

        if provided != Some(expected) {
            tracing::warn!(uri = %request.uri(), "Rejected webhook call with a missing or wrong secret");
            return Err(AppError::Unauthorized("invalid webhook secret".to_string()));
        }
    }

    Ok(next.run(request).await)
}

/// Span for `TraceLayer`; the path is logged without the query string
pub fn make_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
    )
}
