use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use token_notifier::{
    api,
    config::BlobBackend,
    store::{BlobObject, BlobStore, MemoryBlobStore, TokenRepository},
    AppState, Config, NotifierError,
};
use tower::ServiceExt;

type TestResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

const PREFIX: &str = "upstox-token";

fn test_config() -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        blob_backend: BlobBackend::Memory,
        blob_token: None,
        blob_api_url: "memory://".into(),
        blob_timeout_secs: 1,
        key_prefix: PREFIX.into(),
    }
}

/// A blob store whose every call fails, as when the storage API is down.
struct UnreachableStore;

#[async_trait]
impl BlobStore for UnreachableStore {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn put(&self, _: &str, _: Vec<u8>, _: &str) -> Result<BlobObject, NotifierError> {
        Err(NotifierError::Storage("down".into()))
    }

    async fn list(&self, _: &str) -> Result<Vec<BlobObject>, NotifierError> {
        Err(NotifierError::Storage("down".into()))
    }

    async fn get(&self, _: &str) -> Result<String, NotifierError> {
        Err(NotifierError::Storage("down".into()))
    }

    async fn delete(&self, _: &[String]) -> Result<(), NotifierError> {
        Err(NotifierError::Storage("down".into()))
    }
}

fn app_with(store: Arc<dyn BlobStore>) -> Router {
    let state = Arc::new(AppState {
        config: test_config(),
        repo: TokenRepository::new(store, PREFIX),
    });
    api::router(state)
}

fn post_json(body: &str) -> Result<Request<Body>, axum::http::Error> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/notifier")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
}

fn get_token() -> Result<Request<Body>, axum::http::Error> {
    Request::builder().uri("/api/notifier").body(Body::empty())
}

async fn send(app: &Router, req: Request<Body>) -> Result<(StatusCode, Value), Box<dyn std::error::Error + Send + Sync>> {
    let resp = app.clone().oneshot(req).await.unwrap_or_else(|e| match e {});
    let status = resp.status();
    let bytes = resp
        .into_body()
        .collect()
        .await
        .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })?
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

fn millis_from_now(hours: i64) -> String {
    (Utc::now().timestamp_millis() + hours * 3_600_000).to_string()
}

#[tokio::test]
async fn get_without_token_is_404() -> TestResult {
    let app = app_with(Arc::new(MemoryBlobStore::new()));

    let (status, body) = send(&app, get_token()?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["is_valid"], false);
    assert_eq!(body["error"], "No token found");
    Ok(())
}

#[tokio::test]
async fn post_then_get_returns_valid_token() -> TestResult {
    let app = app_with(Arc::new(MemoryBlobStore::new()));
    let expires_at = millis_from_now(10);
    let payload = json!({
        "client_id": "client-1",
        "user_id": "AB1234",
        "access_token": "eyJ0eXAiOiJKV1QiLCJrZXlfaWQiOiJza192MS4wIn0.payload.sig",
        "token_type": "Bearer",
        "expires_at": expires_at,
        "issued_at": Utc::now().timestamp_millis().to_string(),
        "message_type": "access_token",
    });

    let (status, body) = send(&app, post_json(&payload.to_string())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Token stored successfully");
    assert!(body["key"].as_str().unwrap_or_default().starts_with(PREFIX));

    let (status, body) = send(&app, get_token()?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["is_valid"], true);
    assert_eq!(body["access_token"], payload["access_token"]);
    assert_eq!(body["expires_at"], expires_at.as_str());
    assert_eq!(body["client_id"], "client-1");
    assert_eq!(body["user_id"], "AB1234");
    let hours = body["expires_in_hours"].as_f64().unwrap_or_default();
    assert!(hours > 9.9 && hours <= 10.0, "hours = {hours}");
    assert!(body["stored_at"].as_str().unwrap_or_default().ends_with('Z'));
    Ok(())
}

#[tokio::test]
async fn expired_token_is_410() -> TestResult {
    let app = app_with(Arc::new(MemoryBlobStore::new()));
    let payload = json!({ "access_token": "stale", "expires_at": millis_from_now(-1) });

    let (status, _) = send(&app, post_json(&payload.to_string())?).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get_token()?).await?;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["success"], false);
    assert_eq!(body["is_valid"], false);
    assert_eq!(body["error"], "Token expired");
    assert!(body.get("access_token").is_none());
    Ok(())
}

#[tokio::test]
async fn newer_post_replaces_older_token() -> TestResult {
    let store = Arc::new(MemoryBlobStore::new());
    let app = app_with(store.clone());

    for token in ["first", "second", "third"] {
        let payload = json!({ "access_token": token, "expires_at": millis_from_now(5) });
        let (status, _) = send(&app, post_json(&payload.to_string())?).await?;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(store.list(PREFIX).await?.len(), 1);
    let (_, body) = send(&app, get_token()?).await?;
    assert_eq!(body["access_token"], "third");
    Ok(())
}

#[tokio::test]
async fn get_picks_most_recent_upload_when_several_exist() -> TestResult {
    let store = Arc::new(MemoryBlobStore::new());
    let expires_at = millis_from_now(3);
    for token in ["older", "newer"] {
        let record = json!({
            "access_token": token,
            "expires_at": expires_at,
            "stored_at": Utc::now().to_rfc3339(),
        });
        store
            .put(&format!("{PREFIX}.json"), record.to_string().into_bytes(), "application/json")
            .await?;
    }
    let app = app_with(store);

    let (status, body) = send(&app, get_token()?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access_token"], "newer");
    Ok(())
}

#[tokio::test]
async fn post_without_access_token_is_400() -> TestResult {
    let app = app_with(Arc::new(MemoryBlobStore::new()));

    let (status, body) = send(&app, post_json(r#"{"expires_at":"1731448800000"}"#)?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "access_token is required");
    Ok(())
}

#[tokio::test]
async fn post_with_malformed_json_is_400() -> TestResult {
    let store = Arc::new(MemoryBlobStore::new());
    let app = app_with(store.clone());

    let (status, body) = send(&app, post_json("{not json")?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
    assert!(store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn unsupported_method_is_405() -> TestResult {
    let app = app_with(Arc::new(MemoryBlobStore::new()));
    let req = Request::builder()
        .method(Method::DELETE)
        .uri("/api/notifier")
        .body(Body::empty())?;

    let (status, body) = send(&app, req).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");
    Ok(())
}

#[tokio::test]
async fn options_is_ok() -> TestResult {
    let app = app_with(Arc::new(MemoryBlobStore::new()));
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/notifier")
        .body(Body::empty())?;

    let (status, _) = send(&app, req).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn status_reports_backend() -> TestResult {
    let app = app_with(Arc::new(MemoryBlobStore::new()));
    let req = Request::builder().uri("/api/status").body(Body::empty())?;

    let (status, body) = send(&app, req).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");
    assert_eq!(body["prefix"], PREFIX);
    Ok(())
}

#[tokio::test]
async fn storage_failure_is_502() -> TestResult {
    let app = app_with(Arc::new(UnreachableStore));

    let (status, body) = send(&app, get_token()?).await?;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "storage_error");
    assert_eq!(body["error"], "Storage error: down");

    let payload = json!({ "access_token": "tok", "expires_at": millis_from_now(1) });
    let (status, body) = send(&app, post_json(&payload.to_string())?).await?;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "storage_error");
    Ok(())
}
