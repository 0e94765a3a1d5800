use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures of the resilient metadata fetcher
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// Provider answered with a status that is not retried
    #[error("API request failed with status {0}")]
    Status(u16),

    /// Provider answered 200 with a body that is not JSON
    #[error("Malformed response body: {0}")]
    Malformed(String),

    /// Every attempt was rate limited or hit a connection fault
    #[error("max retries exceeded")]
    RetriesExhausted,
}

/// Connection-level faults raised below the HTTP status layer
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connection(String),
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Metadata fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Unexpected response shape: {0}")]
    MalformedResponse(String),

    #[error("Chat platform error: {0}")]
    Chat(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Fetch(_) | AppError::MalformedResponse(_) | AppError::HttpClient(_) => {
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            AppError::Storage(_) | AppError::Chat(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_exhausted_message() {
        assert_eq!(FetchError::RetriesExhausted.to_string(), "max retries exceeded");
    }

    #[test]
    fn test_unauthorized_maps_to_401() {
        let response = AppError::Unauthorized("bad secret".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_fetch_error_maps_to_bad_gateway() {
        let response = AppError::from(FetchError::Status(500)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
