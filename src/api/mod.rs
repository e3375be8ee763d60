//! HTTP router for token-store.
//!
//! - /status          — Health check
//! - {mount_prefix}   — Token CRUD + payload schema (see `routes`)

pub mod routes;

use crate::SharedState;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let prefix = state.config.mount_prefix.clone();

    Router::new()
        .route("/status", get(routes::status))
        .nest(&prefix, routes::token_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
