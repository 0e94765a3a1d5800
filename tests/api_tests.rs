use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use movie_bot::{
    api::{create_router, AppState},
    bot::{ChatId, ChatTransport, Controller, MessageId},
    db::{sqlite::create_memory_pool, DuplicatePolicy, FavoritesStore},
    error::AppResult,
    middleware::SECRET_TOKEN_HEADER,
    models::{ContentDetail, ContentId, MediaKind, ResultItem},
    services::{providers::MetadataProvider, DisplayPayload, Renderer},
};

struct SilentTransport;

#[async_trait::async_trait]
impl ChatTransport for SilentTransport {
    async fn send(&self, _chat_id: ChatId, _payload: &DisplayPayload) -> AppResult<MessageId> {
        Ok(1)
    }

    async fn delete(&self, _chat_id: ChatId, _message_id: MessageId) -> AppResult<()> {
        Ok(())
    }

    async fn notify(&self, _callback_id: &str, _text: Option<&str>) -> AppResult<()> {
        Ok(())
    }
}

struct EmptyCatalog;

#[async_trait::async_trait]
impl MetadataProvider for EmptyCatalog {
    async fn search(&self, _query: &str) -> AppResult<Vec<ResultItem>> {
        Ok(vec![])
    }

    async fn popular(&self, _kind: MediaKind) -> AppResult<Vec<ResultItem>> {
        Ok(vec![])
    }

    async fn similar(&self, _content_id: ContentId) -> AppResult<Vec<ResultItem>> {
        Ok(vec![])
    }

    async fn detail(&self, _kind: MediaKind, content_id: ContentId) -> AppResult<ContentDetail> {
        Ok(ContentDetail {
            content_id,
            title: "Untitled".to_string(),
            poster_path: None,
        })
    }

    async fn random(&self, _kind: MediaKind) -> AppResult<Option<ResultItem>> {
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "empty"
    }
}

async fn create_test_app(webhook_secret: Option<&str>) -> Router {
    let pool = create_memory_pool().await.unwrap();
    let controller = Controller::new(
        Arc::new(EmptyCatalog),
        FavoritesStore::new(pool),
        Arc::new(SilentTransport),
        Renderer::new("https://image.tmdb.org/t/p/w500"),
        DuplicatePolicy::SkipExisting,
    );
    let state = AppState::new(Arc::new(controller), webhook_secret.map(str::to_string));
    create_router(state)
}

fn start_update() -> Value {
    json!({
        "update_id": 1,
        "message": {
            "message_id": 1,
            "chat": {"id": 100, "type": "private"},
            "from": {"id": 7, "is_bot": false, "first_name": "Ann"},
            "text": "/start"
        }
    })
}

fn webhook_request(body: &Value, secret: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json");
    if let Some(secret) = secret {
        builder = builder.header(SECRET_TOKEN_HEADER, secret);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app(None).await;

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_webhook_accepts_update() {
    let app = create_test_app(None).await;

    let response = app
        .oneshot(webhook_request(&start_update(), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_webhook_acknowledges_unsupported_update() {
    let app = create_test_app(None).await;

    let response = app
        .oneshot(webhook_request(&json!({"update_id": 2, "edited_message": {}}), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_webhook_rejects_wrong_secret() {
    let app = create_test_app(Some("s3cret")).await;

    let missing = app
        .clone()
        .oneshot(webhook_request(&start_update(), None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let wrong = app
        .oneshot(webhook_request(&start_update(), Some("guess")))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_webhook_accepts_matching_secret() {
    let app = create_test_app(Some("s3cret")).await;

    let response = app
        .oneshot(webhook_request(&start_update(), Some("s3cret")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_is_not_behind_secret() {
    let app = create_test_app(Some("s3cret")).await;

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_webhook_rejects_body_without_update_id() {
    let app = create_test_app(None).await;

    let response = app
        .oneshot(webhook_request(&json!({"message": null}), None))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}
