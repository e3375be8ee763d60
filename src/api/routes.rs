//! Token API handlers.
//!
//! Mounted under the configured prefix (default `/oauth2-token`):
//! - `GET    /schema` — JSON Schema of the token payload
//! - `POST   /`       — store a token
//! - `GET    /{id}`   — fetch one token
//! - `DELETE /{id}`   — delete one token

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::ManagedTokenView;
use crate::schema::{oauth2_token_schema, CreateOAuth2TokenRequest};
use crate::SharedState;

pub fn token_router(state: SharedState) -> Router {
    Router::new()
        .route("/", post(token_create))
        .route("/schema", get(token_schema))
        .route("/{id}", get(token_get).delete(token_delete))
        .with_state(state)
}

fn not_found() -> StoreError {
    StoreError::NotFound("OAuth2 token".into())
}

// =============================================================================
// Health
// =============================================================================

pub async fn status() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "token-store",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// =============================================================================
// Token Endpoints
// =============================================================================

/// GET /schema — Payload schema for dynamic client forms.
async fn token_schema() -> Json<serde_json::Value> {
    Json(oauth2_token_schema())
}

/// POST / — Store a token. Expiry is derived from `expires_in` unless given.
async fn token_create(
    State(state): State<SharedState>,
    body: Result<Json<CreateOAuth2TokenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ManagedTokenView>), StoreError> {
    let Json(request) = body?;
    let record = request.into_record(Utc::now())?;

    state.store.insert(&record).await?;
    info!(
        "Stored token {} ({:?}) for {}",
        record.id, record.name, record.created_by
    );

    Ok((StatusCode::CREATED, Json(record.view())))
}

/// GET /{id} — Fetch a token, backfilling a missing expiry from its payload.
async fn token_get(
    State(state): State<SharedState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ManagedTokenView>, StoreError> {
    let Path(id) = id?;
    let mut token = state.store.get(id).await?.ok_or_else(not_found)?;

    if token.ensure_expires_at() {
        if let Some(expires_at) = token.expires_at {
            let now = Utc::now();
            if state.store.fill_expires_at(id, expires_at, now).await? {
                token.updated_at = now;
                info!("Backfilled expiry for token {id}");
            } else {
                // Filled or deleted by a concurrent request; report what is stored.
                token = state.store.get(id).await?.ok_or_else(not_found)?;
            }
        }
    }

    Ok(Json(token.view()))
}

/// DELETE /{id} — Hard delete.
async fn token_delete(
    State(state): State<SharedState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, StoreError> {
    let Path(id) = id?;

    if !state.store.delete(id).await? {
        return Err(not_found());
    }
    info!("Deleted token {id}");

    Ok(StatusCode::NO_CONTENT)
}
