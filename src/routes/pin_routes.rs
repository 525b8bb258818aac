use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::ApiError;
use crate::services::{connection_service, pin_service};
use crate::state::app::AppState;

/// Build all pin routes under /pins
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_pins).post(create_pin))
        .route("/:id", delete(remove_pin))
        .route(
            "/:id/connections",
            get(pin_connections).post(connect_from_pin),
        )
        .route("/:id/connections/:target_id", delete(disconnect_from_pin))
        .with_state(state)
}

/// Body of POST /pins/{id}/connections.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectFromPinRequest {
    pub target_pin_id: String,
    #[serde(default)]
    pub label: Option<String>,
}

//
// ─────────────────────────────────────────────────────────────
// GET /pins
// All pins, newest first
// ─────────────────────────────────────────────────────────────
//
async fn list_pins(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let pins = pin_service::list(&state.store).await?;
    Ok(Json(json!({ "status": "success", "pins": pins })))
}

//
// ─────────────────────────────────────────────────────────────
// POST /pins
// Create a pin, geocode best-effort, broadcast pin_added
// ─────────────────────────────────────────────────────────────
//
async fn create_pin(
    State(state): State<AppState>,
    Json(req): Json<pin_service::CreatePinRequest>,
) -> Result<Json<Value>, ApiError> {
    let pin = pin_service::create(&state.store, &state.geocoder, req).await?;

    state
        .broadcaster
        .publish(json!({ "type": "pin_added", "pin": pin }).to_string());

    Ok(Json(json!({ "status": "success", "pin": pin })))
}

//
// ─────────────────────────────────────────────────────────────
// DELETE /pins/{id}
// 404 if absent; broadcasts pin_removed
// ─────────────────────────────────────────────────────────────
//
async fn remove_pin(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    pin_service::delete(&state.store, &id).await?;

    state
        .broadcaster
        .publish(json!({ "type": "pin_removed", "id": id }).to_string());

    Ok(Json(json!({
        "status": "success",
        "message": "Pin deleted successfully"
    })))
}

//
// ─────────────────────────────────────────────────────────────
// GET /pins/{id}/connections
// Connections attached to one pin
// ─────────────────────────────────────────────────────────────
//
async fn pin_connections(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let connections = connection_service::for_pin(&state.store, &id).await?;
    Ok(Json(
        json!({ "status": "success", "connections": connections }),
    ))
}

//
// ─────────────────────────────────────────────────────────────
// POST /pins/{id}/connections
// Same canonical bidirectional create as POST /connections
// ─────────────────────────────────────────────────────────────
//
async fn connect_from_pin(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(req): Json<ConnectFromPinRequest>,
) -> Result<Json<Value>, ApiError> {
    let connection =
        connection_service::add(&state.store, &id, &req.target_pin_id, req.label).await?;

    state
        .broadcaster
        .publish(json!({ "type": "connection_added", "connection": connection }).to_string());

    Ok(Json(
        json!({ "status": "success", "connection": connection }),
    ))
}

//
// ─────────────────────────────────────────────────────────────
// DELETE /pins/{id}/connections/{target_id}
// Removes the unordered pair from both endpoints
// ─────────────────────────────────────────────────────────────
//
async fn disconnect_from_pin(
    Path((id, target_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    connection_service::delete(&state.store, &id, &target_id).await?;

    state.broadcaster.publish(
        json!({
            "type": "connection_removed",
            "sourceId": id,
            "targetId": target_id
        })
        .to_string(),
    );

    Ok(Json(json!({ "status": "success" })))
}
