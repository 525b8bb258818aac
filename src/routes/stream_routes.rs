use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::{Stream, StreamExt};

use crate::state::app::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/stream", get(stream_events))
        .with_state(state)
}

/// GET /stream
///
/// Long-lived SSE session: registers a broadcaster subscriber and pumps its
/// events to the client as `data:` frames, buffered history first. When the
/// client goes away the stream is dropped, which unregisters the subscriber.
async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscriber = state.broadcaster.register();
    let events = subscriber.map(|payload| Ok(Event::default().data(payload)));

    Sse::new(events).keep_alive(KeepAlive::default())
}
