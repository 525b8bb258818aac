//! Integration tests for the HTTP surface.
//!
//! Exercises the full router: pin CRUD, bidirectional connections, error
//! envelopes, and broadcast observation. Geocoding is disabled so no test
//! touches the network.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use pinboard::app::build_app;
use pinboard::config::AppConfig;
use pinboard::state::app::AppState;

/// Build a test app over a throwaway pins directory.
async fn test_app() -> (Router, AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();

    let config = AppConfig {
        port: 0,
        log_level: "warn".to_string(),
        server_version: "test".to_string(),
        pins_dir: dir.path().to_str().unwrap().to_string(),
        history_capacity: 100,
        geocode_url: None,
        giphy_api_key: None,
    };

    let state = AppState::new(config).await.unwrap();
    (build_app(state.clone()), state, dir)
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    match body {
        Some(json_body) => builder.body(Body::from(json_body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(json!({}))
}

/// POST a pin and return its record.
async fn create_pin(app: &Router, lat: f64, lng: f64, name: &str) -> Value {
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/pins",
            Some(json!({ "lat": lat, "lng": lng, "name": name })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "success");
    body["pin"].clone()
}

#[tokio::test]
async fn create_pin_round_trip_and_broadcast() {
    let (app, state, _dir) = test_app().await;
    let mut subscriber = state.broadcaster.register();

    let pin = create_pin(&app, 52.5, 13.4, "Berlin").await;

    assert_eq!(pin["lat"], 52.5);
    assert_eq!(pin["lng"], 13.4);
    assert_eq!(pin["name"], "Berlin");
    assert_eq!(pin["id"].as_str().unwrap().len(), 36);
    assert_eq!(pin["location"], "Unknown location");
    assert!(pin["timestamp"].is_string());

    // A registered stream subscriber observes the event.
    let event: Value = serde_json::from_str(&subscriber.recv().await.unwrap()).unwrap();
    assert_eq!(event["type"], "pin_added");
    assert_eq!(event["pin"]["id"], pin["id"]);

    // And a fresh listing includes the pin, newest first.
    let response = app
        .clone()
        .oneshot(request(Method::GET, "/pins", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["pins"][0]["id"], pin["id"]);
}

#[tokio::test]
async fn listing_an_empty_board_succeeds() {
    let (app, _state, _dir) = test_app().await;

    let response = app
        .oneshot(request(Method::GET, "/pins", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["pins"], json!([]));
}

#[tokio::test]
async fn pins_are_listed_newest_first() {
    let (app, _state, _dir) = test_app().await;

    let first = create_pin(&app, 1.0, 1.0, "first").await;
    let second = create_pin(&app, 2.0, 2.0, "second").await;

    let response = app
        .oneshot(request(Method::GET, "/pins", None))
        .await
        .unwrap();
    let body = response_json(response).await;

    assert_eq!(body["pins"][0]["id"], second["id"]);
    assert_eq!(body["pins"][1]["id"], first["id"]);
}

#[tokio::test]
async fn invalid_pin_input_yields_the_error_envelope() {
    let (app, _state, _dir) = test_app().await;

    let response = app
        .oneshot(request(
            Method::POST,
            "/pins",
            Some(json!({ "lat": 123.0, "lng": 13.4, "name": "nowhere" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("lat"));
}

#[tokio::test]
async fn deleting_a_pin_then_deleting_again_is_not_found() {
    let (app, state, _dir) = test_app().await;

    let pin = create_pin(&app, 52.5, 13.4, "Berlin").await;
    let id = pin["id"].as_str().unwrap();
    let uri = format!("/pins/{id}");

    let mut subscriber = state.broadcaster.register();

    let response = app
        .clone()
        .oneshot(request(Method::DELETE, &uri, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let event: Value = serde_json::from_str(&subscriber.recv().await.unwrap()).unwrap();
    assert_eq!(event["type"], "pin_removed");
    assert_eq!(event["id"], pin["id"]);

    let response = app
        .clone()
        .oneshot(request(Method::DELETE, &uri, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response_json(response).await["status"], "error");

    // Gone from listings too.
    let response = app
        .oneshot(request(Method::GET, "/pins", None))
        .await
        .unwrap();
    assert_eq!(response_json(response).await["pins"], json!([]));
}

#[tokio::test]
async fn duplicate_connections_conflict_in_both_directions() {
    let (app, state, _dir) = test_app().await;

    let a = create_pin(&app, 1.0, 1.0, "a").await;
    let b = create_pin(&app, 2.0, 2.0, "b").await;
    let (a, b) = (a["id"].as_str().unwrap(), b["id"].as_str().unwrap());

    let mut subscriber = state.broadcaster.register();

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/connections",
            Some(json!({ "sourceId": a, "targetId": b })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["connection"]["sourceId"], a);
    assert_eq!(body["connection"]["targetId"], b);

    let event: Value = serde_json::from_str(&subscriber.recv().await.unwrap()).unwrap();
    assert_eq!(event["type"], "connection_added");

    // Same pair, both directions: conflict.
    for (source, target) in [(a, b), (b, a)] {
        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/connections",
                Some(json!({ "sourceId": source, "targetId": target })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(response_json(response).await["status"], "error");
    }

    // The aggregate view holds a single logical connection.
    let response = app
        .oneshot(request(Method::GET, "/connections", None))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["connections"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn per_pin_connection_routes_use_the_bidirectional_model() {
    let (app, _state, _dir) = test_app().await;

    let a = create_pin(&app, 1.0, 1.0, "a").await;
    let b = create_pin(&app, 2.0, 2.0, "b").await;
    let (a, b) = (a["id"].as_str().unwrap(), b["id"].as_str().unwrap());

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/pins/{a}/connections"),
            Some(json!({ "targetPinId": b, "label": "friends" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Both endpoints see the connection.
    for id in [a, b] {
        let response = app
            .clone()
            .oneshot(request(
                Method::GET,
                &format!("/pins/{id}/connections"),
                None,
            ))
            .await
            .unwrap();
        let body = response_json(response).await;
        assert_eq!(body["connections"].as_array().unwrap().len(), 1);
        assert_eq!(body["connections"][0]["label"], "friends");
    }

    let response = app
        .clone()
        .oneshot(request(
            Method::DELETE,
            &format!("/pins/{a}/connections/{b}"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for id in [a, b] {
        let response = app
            .clone()
            .oneshot(request(
                Method::GET,
                &format!("/pins/{id}/connections"),
                None,
            ))
            .await
            .unwrap();
        let body = response_json(response).await;
        assert_eq!(body["connections"], json!([]));
    }
}

#[tokio::test]
async fn connecting_to_a_missing_pin_is_not_found() {
    let (app, _state, _dir) = test_app().await;

    let a = create_pin(&app, 1.0, 1.0, "a").await;
    let a = a["id"].as_str().unwrap();

    let response = app
        .oneshot(request(
            Method::POST,
            "/connections",
            Some(json!({
                "sourceId": a,
                "targetId": "00000000-0000-0000-0000-000000000000"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Target pin not found");
}

#[tokio::test]
async fn light_map_snapshot_embeds_the_pins() {
    let (app, _state, _dir) = test_app().await;

    create_pin(&app, 52.5, 13.4, "Berlin").await;

    let response = app
        .oneshot(request(Method::GET, "/generate-light-map", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .contains("attachment"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("Berlin"));
    assert!(html.contains("leaflet"));
}

#[tokio::test]
async fn random_gif_without_a_key_is_an_upstream_error() {
    let (app, _state, _dir) = test_app().await;

    let response = app
        .oneshot(request(Method::GET, "/api/random-gif", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = response_json(response).await;
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn system_and_preflight_routes_answer() {
    let (app, _state, _dir) = test_app().await;

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/system/alive", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/system/version", None))
        .await
        .unwrap();
    assert_eq!(response_json(response).await["version"], "test");

    let response = app
        .oneshot(request(Method::OPTIONS, "/options", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
