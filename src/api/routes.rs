//! Route handlers for the notifier endpoint.
//!
//! All handlers receive `SharedState` via Axum state extraction. Callers are
//! not authenticated.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::error::NotifierError;
use crate::token::{TokenPayload, TokenRecord};
use crate::SharedState;

pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/status", get(status))
        .route(
            "/notifier",
            get(notifier_get)
                .post(notifier_post)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

async fn status(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "token-notifier",
        "version": env!("CARGO_PKG_VERSION"),
        "backend": state.repo.backend(),
        "prefix": state.repo.prefix(),
    }))
}

// =============================================================================
// Notifier
// =============================================================================

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> NotifierError {
    NotifierError::MethodNotAllowed
}

/// POST /api/notifier — store a freshly issued token, replacing any previous one.
///
/// The body is parsed by hand so malformed JSON gets the same error shape as
/// every other failure.
async fn notifier_post(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, NotifierError> {
    let payload: TokenPayload = serde_json::from_slice(&body)
        .map_err(|e| NotifierError::BadRequest(format!("Invalid JSON body: {e}")))?;

    let record = TokenRecord::from_payload(payload, Utc::now())?;
    let object = state.repo.save(&record).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Token stored successfully",
        "stored_at": record.stored_at,
        "expires_at": record.expires_at,
        "key": object.pathname,
    })))
}

/// GET /api/notifier — return the newest stored token and whether it is still usable.
async fn notifier_get(State(state): State<SharedState>) -> Result<Response, NotifierError> {
    let record = state.repo.latest().await?.ok_or(NotifierError::NotFound)?;
    let token_status = record.status(Utc::now());

    if !token_status.is_valid {
        warn!(
            "Served expired token {}... (expires_at={:?})",
            record.preview(),
            record.expires_at
        );
        let body = json!({
            "success": false,
            "error": NotifierError::TokenExpired.to_string(),
            "code": "token_expired",
            "is_valid": false,
            "expires_at": record.expires_at,
            "expires_in_hours": token_status.expires_in_hours,
            "stored_at": record.stored_at,
        });
        return Ok((StatusCode::GONE, Json(body)).into_response());
    }

    info!(
        "Served token {}... ({:?}h left)",
        record.preview(),
        token_status.expires_in_hours
    );
    Ok(Json(json!({
        "success": true,
        "is_valid": true,
        "access_token": record.access_token,
        "expires_at": record.expires_at,
        "expires_in_hours": token_status.expires_in_hours,
        "issued_at": record.issued_at,
        "client_id": record.client_id,
        "user_id": record.user_id,
        "stored_at": record.stored_at,
    }))
    .into_response())
}
