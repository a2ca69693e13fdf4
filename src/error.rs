use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Unified error type for the token notifier.
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    // ── Request Errors ──────────────────────────────────────────────────
    #[error("{0}")]
    BadRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    // ── Token Errors ────────────────────────────────────────────────────
    #[error("No token found")]
    NotFound,

    #[error("Token expired")]
    TokenExpired,

    // ── Storage Errors ──────────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    // ── Internal ────────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NotifierError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            NotifierError::BadRequest(_) => StatusCode::BAD_REQUEST,
            NotifierError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            NotifierError::NotFound => StatusCode::NOT_FOUND,
            NotifierError::TokenExpired => StatusCode::GONE,
            NotifierError::Storage(_) => StatusCode::BAD_GATEWAY,
            NotifierError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            NotifierError::BadRequest(_) => "bad_request",
            NotifierError::MethodNotAllowed => "method_not_allowed",
            NotifierError::NotFound => "not_found",
            NotifierError::TokenExpired => "token_expired",
            NotifierError::Storage(_) => "storage_error",
            NotifierError::Internal(_) => "internal_error",
        }
    }
}

impl From<reqwest::Error> for NotifierError {
    fn from(e: reqwest::Error) -> Self {
        tracing::error!("Blob request failed: {e}");
        NotifierError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for NotifierError {
    fn from(e: serde_json::Error) -> Self {
        tracing::error!("JSON error: {e}");
        NotifierError::Internal(e.to_string())
    }
}

impl From<anyhow::Error> for NotifierError {
    fn from(e: anyhow::Error) -> Self {
        NotifierError::Internal(e.to_string())
    }
}

impl IntoResponse for NotifierError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "error": self.to_string(),
            "code": self.code(),
        });
        if matches!(self, NotifierError::NotFound | NotifierError::TokenExpired) {
            body["is_valid"] = json!(false);
        }

        (self.status_code(), axum::Json(body)).into_response()
    }
}
