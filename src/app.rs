use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::routes::{connection_routes, misc_routes, pin_routes, stream_routes, system_routes};
use crate::state::app::AppState;

/// Build the complete Axum application:
/// - /pins         (pin CRUD + per-pin connection views)
/// - /connections  (bidirectional connection CRUD)
/// - /stream       (live SSE event stream)
/// - /generate-light-map, /api/random-gif, /options
/// - /system       (alive + version)
///
/// Every response carries permissive CORS headers; the frontend is served
/// from a different origin.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        // /pins/*
        .nest("/pins", pin_routes::routes(state.clone()))

        // /connections/*
        .nest("/connections", connection_routes::routes(state.clone()))

        // /stream
        .merge(stream_routes::routes(state.clone()))

        // /generate-light-map, /api/random-gif, /options
        .merge(misc_routes::routes(state.clone()))

        // /system/*
        .nest("/system", system_routes::routes(state.config.clone()))

        // Logging middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )

        // Permissive cross-origin policy, preflight included
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
