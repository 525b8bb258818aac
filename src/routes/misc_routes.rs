use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, options},
    Json, Router,
};
use serde_json::{json, Value};

use crate::errors::ApiError;
use crate::services::{gif_service, pin_service, snapshot_service};
use crate::state::app::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/generate-light-map", get(generate_light_map))
        .route("/api/random-gif", get(random_gif))
        .route("/options", options(preflight))
        .with_state(state)
}

//
// ─────────────────────────────────────────────────────────────
// GET /generate-light-map
// Standalone HTML snapshot of the board, as a download
// ─────────────────────────────────────────────────────────────
//
async fn generate_light_map(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let pins = pin_service::list(&state.store).await?;
    let html = snapshot_service::render_light_map(&pins)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=map-snapshot.html",
            ),
        ],
        html,
    ))
}

//
// ─────────────────────────────────────────────────────────────
// GET /api/random-gif
// Giphy proxy; failures surface as upstream errors
// ─────────────────────────────────────────────────────────────
//
async fn random_gif(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let url = gif_service::random_gif(&state.http, state.config.giphy_api_key.as_deref()).await?;
    Ok(Json(json!({ "status": "success", "url": url })))
}

/// OPTIONS /options — empty preflight answer; the CORS headers themselves
/// come from the router-wide CorsLayer.
async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}
