use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::ApiError;
use crate::services::connection_service;
use crate::state::app::AppState;

/// Build all connection routes under /connections
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_connections).post(create_connection))
        .route("/:source_id/:target_id", delete(remove_connection))
        .with_state(state)
}

/// Body of POST /connections.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConnectionRequest {
    pub source_id: String,
    pub target_id: String,
    #[serde(default)]
    pub label: Option<String>,
}

//
// ─────────────────────────────────────────────────────────────
// GET /connections
// Aggregate across all pins, de-duplicated by connection id
// ─────────────────────────────────────────────────────────────
//
async fn list_connections(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let connections = connection_service::list_all(&state.store).await?;
    Ok(Json(
        json!({ "status": "success", "connections": connections }),
    ))
}

//
// ─────────────────────────────────────────────────────────────
// POST /connections
// Writes the record to both endpoints, broadcasts connection_added
// ─────────────────────────────────────────────────────────────
//
async fn create_connection(
    State(state): State<AppState>,
    Json(req): Json<CreateConnectionRequest>,
) -> Result<Json<Value>, ApiError> {
    let connection =
        connection_service::add(&state.store, &req.source_id, &req.target_id, req.label).await?;

    state
        .broadcaster
        .publish(json!({ "type": "connection_added", "connection": connection }).to_string());

    Ok(Json(
        json!({ "status": "success", "connection": connection }),
    ))
}

//
// ─────────────────────────────────────────────────────────────
// DELETE /connections/{source_id}/{target_id}
// Removes matching entries from both endpoints
// ─────────────────────────────────────────────────────────────
//
async fn remove_connection(
    Path((source_id, target_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    connection_service::delete(&state.store, &source_id, &target_id).await?;

    state.broadcaster.publish(
        json!({
            "type": "connection_removed",
            "sourceId": source_id,
            "targetId": target_id
        })
        .to_string(),
    );

    Ok(Json(json!({ "status": "success" })))
}
