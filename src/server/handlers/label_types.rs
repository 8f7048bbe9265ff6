//! Label type registry endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;

use super::error;
use crate::registry::LabelTypeDef;
use crate::server::state::AppState;

/// Handle GET /api/label-types.
///
/// `degraded` is true while the store is unreachable and only the built-in
/// types are listed.
pub async fn list(State(state): State<Arc<AppState>>) -> Response {
    Json(json!({
        "labelTypes": state.registry.list().await,
        "degraded": state.registry.is_degraded().await,
    }))
    .into_response()
}

/// Handle POST /api/label-types - create or replace.
pub async fn save(State(state): State<Arc<AppState>>, Json(def): Json<LabelTypeDef>) -> Response {
    match state.registry.save(def).await {
        Ok(saved) => Json(saved).into_response(),
        Err(e) => error(StatusCode::BAD_REQUEST, &e.to_string()),
    }
}

/// Handle DELETE /api/label-types/:id.
pub async fn delete(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.registry.delete(&id).await {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(e) => error(StatusCode::BAD_REQUEST, &e.to_string()),
    }
}
