//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bounce_shared::time::timestamp_to_rfc3339;

use crate::{
    config::Config,
    domain::StoreError,
    infrastructure::dto::{
        http::{ConnectionDto, ErrorDto, HealthDto},
        websocket::WorldDump,
    },
    ui::state::AppState,
};

type ApiError = (StatusCode, Json<ErrorDto>);

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
        started_at: timestamp_to_rfc3339(state.started_at),
    })
}

/// Effective configuration (admin)
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Config> {
    Json(state.config.as_ref().clone())
}

/// Current world dump (debug)
pub async fn get_world(State(state): State<Arc<AppState>>) -> Json<WorldDump> {
    Json(state.game.dump().await)
}

/// Connected clients, oldest first
pub async fn get_connections(State(state): State<Arc<AppState>>) -> Json<Vec<ConnectionDto>> {
    // Domain Model から DTO への変換
    let connections = state
        .hub
        .connections()
        .await
        .into_iter()
        .map(|info| ConnectionDto {
            client_id: info.client_id.into_string(),
            status: info.status,
            connected_at: timestamp_to_rfc3339(info.connected_at),
        })
        .collect();
    Json(connections)
}

/// Whole store tree
pub async fn get_store_tree(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.tree("").await.map(Json).map_err(store_error)
}

/// Value at a key path, or the subtree when the path names a bucket
pub async fn get_store_value(
    State(state): State<Arc<AppState>>,
    Path(key_path): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match state.store.get(&key_path).await {
        Ok(value) => Ok(Json(value)),
        Err(StoreError::NotAValue(_)) => {
            state.store.tree(&key_path).await.map(Json).map_err(store_error)
        }
        Err(e) => Err(store_error(e)),
    }
}

fn store_error(error: StoreError) -> ApiError {
    let status = match error {
        StoreError::InvalidKeyPath(_) => StatusCode::BAD_REQUEST,
        StoreError::BucketNotFound { .. } | StoreError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        StoreError::NotAValue(_) | StoreError::NotABucket(_) => StatusCode::CONFLICT,
    };
    tracing::debug!("Store lookup failed: {}", error);
    (
        status,
        Json(ErrorDto {
            error: error.to_string(),
        }),
    )
}
