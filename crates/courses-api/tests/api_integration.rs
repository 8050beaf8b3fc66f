//! End-to-end tests for the HTTP surface.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`; the
//! resolver is built without providers so route requests never leave the
//! process.

use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use courses::{config::SimulationConfig, routing::RouteResolver};
use courses_api::create_router;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    create_router(
        RouteResolver::new(Duration::from_secs(1)),
        SimulationConfig::default(),
    )
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn post_empty(app: &Router, uri: &str) -> StatusCode {
    let request = Request::post(uri).body(Body::empty()).unwrap();
    send(app, request).await.0
}

#[tokio::test]
async fn test_health_sets_security_headers() {
    let app = app();
    let response = app
        .oneshot(
            Request::get("/health")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_list_and_get_courses() {
    let app = app();

    let (status, list) = get_json(&app, "/courses").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"hangang-riverside"));
    assert!(ids.contains(&"namsan-circuit"));

    let (status, course) = get_json(&app, "/courses/hangang-riverside").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(course["target_duration_seconds"], 540.0);
    assert_eq!(course["path"].as_array().unwrap().len(), 5);

    let (status, body) = get_json(&app, "/courses/atlantis").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("atlantis"));
}

#[tokio::test]
async fn test_course_position_is_clamped() {
    let app = app();

    let (status, start) = get_json(&app, "/courses/hangang-riverside/position?progress=-20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(start["cumulative_distance_meters"], 0.0);
    assert!((start["lat"].as_f64().unwrap() - 37.5284).abs() < 1e-9);

    let (status, end) = get_json(&app, "/courses/hangang-riverside/position?progress=150").await;
    assert_eq!(status, StatusCode::OK);
    assert!((end["lat"].as_f64().unwrap() - 37.5262).abs() < 1e-9);
    assert!((end["lng"].as_f64().unwrap() - 126.9409).abs() < 1e-9);
}

#[tokio::test]
async fn test_candidates() {
    let app = app();

    let (status, body) = get_json(&app, "/candidates?lat=37.5665&lng=126.978&radius=3000").await;
    assert_eq!(status, StatusCode::OK);
    let count = body.as_array().unwrap().len();
    assert!((5..=8).contains(&count), "got {count} candidates");

    let (status, body) = get_json(&app, "/candidates?lat=37.5665&lng=126.978&radius=100").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("radius"));

    let (status, _) = get_json(&app, "/candidates?lat=91&lng=126.978").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get_json(&app, "/candidates?lat=NaN&lng=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("finite"));
}

#[tokio::test]
async fn test_resolve_route_falls_back_without_providers() {
    let app = app();

    let (status, route) = post_json(
        &app,
        "/routes/resolve",
        json!({
            "start": { "lat": 37.5665, "lng": 126.978 },
            "end": { "lat": 37.5765, "lng": 126.978 },
            "activity": "run",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(route["provider_used"], "fallback-straight");
    assert!(route["path"].as_array().unwrap().len() >= 20);
    assert_eq!(route["instructions"].as_array().unwrap().len(), 5);

    let (status, _) = post_json(
        &app,
        "/routes/resolve",
        json!({
            "start": { "lat": 95.0, "lng": 126.978 },
            "end": { "lat": 37.5765, "lng": 126.978 },
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(start_paused = true)]
async fn test_session_lifecycle() {
    let app = app();

    let (status, created) = post_json(
        &app,
        "/sessions",
        json!({ "course_id": "hangang-riverside", "body_weight_kg": 70.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["phase"], "running");
    let id = created["session_id"].as_str().unwrap().to_string();

    tokio::time::sleep(Duration::from_millis(2050)).await;

    let (status, view) = get_json(&app, &format!("/sessions/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["course_id"], "hangang-riverside");
    assert!(view["state"]["elapsed_seconds"].as_f64().unwrap() >= 2.0);

    assert_eq!(
        post_empty(&app, &format!("/sessions/{id}/pause")).await,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        post_empty(&app, &format!("/sessions/{id}/pause")).await,
        StatusCode::CONFLICT
    );
    assert_eq!(
        post_empty(&app, &format!("/sessions/{id}/resume")).await,
        StatusCode::NO_CONTENT
    );

    // No summary exists until the session is stopped.
    let (status, _) = get_json(&app, &format!("/sessions/{id}/gpx")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, summary) = post_json(&app, &format!("/sessions/{id}/stop"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["course_id"], "hangang-riverside");
    assert_eq!(summary["completed"], false);

    // Stopping again hands back the same summary.
    let (status, again) = post_json(&app, &format!("/sessions/{id}/stop"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["elapsed_seconds"], summary["elapsed_seconds"]);

    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/sessions/{id}/gpx"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/gpx+xml"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("<gpx"));

    // Finished sessions are dropped once the retention window lapses.
    tokio::time::sleep(courses_api::sessions::DEFAULT_RETENTION + Duration::from_secs(1)).await;
    let (status, _) = get_json(&app, &format!("/sessions/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_errors() {
    let app = app();

    let (status, _) = post_json(&app, "/sessions", json!({ "course_id": "atlantis" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = post_json(
        &app,
        "/sessions",
        json!({ "course_id": "hangang-riverside", "body_weight_kg": 5.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("body_weight_kg"));

    let unknown = uuid::Uuid::new_v4();
    let (status, _) = get_json(&app, &format!("/sessions/{unknown}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        post_empty(&app, &format!("/sessions/{unknown}/stop")).await,
        StatusCode::NOT_FOUND
    );
}
