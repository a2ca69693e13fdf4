//! HTTP router for the token notifier.
//!
//! - /api/notifier — store (POST) and read (GET) the access token
//! - /api/status   — Health check

pub mod routes;

use crate::SharedState;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", routes::api_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
