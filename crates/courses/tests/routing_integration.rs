//! Route resolution against scripted providers and against the real HTTP
//! clients talking to an in-process mock server.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use courses::prelude::*;
use serde_json::json;

enum Script {
    NoRoute,
    Fail,
    Quota,
}

struct ScriptedProvider {
    script: Script,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    fn new(script: Script) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                script,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl RouteProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn directions(&self, _request: &RouteRequest) -> Result<ProviderRoute, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::NoRoute => Err(ProviderError::NoRoute),
            Script::Fail => Err(ProviderError::Unavailable("service down".into())),
            Script::Quota => Err(ProviderError::QuotaExceeded),
        }
    }
}

fn seoul_request() -> RouteRequest {
    RouteRequest::new(
        LatLng::new(37.50, 127.00),
        LatLng::new(37.51, 127.00),
        ActivityType::Run,
    )
}

#[tokio::test]
async fn test_no_route_then_failure_degrades_to_straight_line() {
    let (primary, primary_calls) = ScriptedProvider::new(Script::NoRoute);
    let (secondary, secondary_calls) = ScriptedProvider::new(Script::Fail);
    let resolver = RouteResolver::new(Duration::from_secs(8))
        .with_provider("primary", primary)
        .with_provider("secondary", secondary);

    let route = resolver.resolve(&seoul_request()).await;

    assert_eq!(route.provider_used, "fallback-straight");
    assert!(route.path.len() >= 20);
    assert!((route.distance_meters - 1112.0).abs() < 5.0);
    assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
    assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_quota_error_skips_secondary() {
    let (primary, _) = ScriptedProvider::new(Script::Quota);
    let (secondary, secondary_calls) = ScriptedProvider::new(Script::NoRoute);
    let resolver = RouteResolver::new(Duration::from_secs(8))
        .with_provider("primary", primary)
        .with_provider("secondary", secondary);

    let route = resolver.resolve(&seoul_request()).await;

    assert!(route.is_fallback());
    assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_fallback_route_feeds_a_course() {
    let resolver = RouteResolver::new(Duration::from_secs(8));
    let route = resolver.resolve(&seoul_request()).await;

    // 1112 m at 10 km/h
    assert!((route.exercise_duration_minutes - 6.672).abs() < 0.05);

    let course =
        CourseDefinition::from_route("resolved", "Resolved", &route, ActivityType::Run).unwrap();
    assert_eq!(course.path().len(), route.path.len());
    assert!((course.total_distance_meters() - route.distance_meters).abs() < 0.5);
    assert!((course.target_duration_seconds() - route.exercise_duration_minutes * 60.0).abs() < 1e-9);
}

async fn spawn_mock(router: Router) -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{addr}"))
}

fn config(base: &str, google: &str, tmap: &str) -> ResolverConfig {
    ResolverConfig {
        provider_timeout: Duration::from_secs(5),
        primary: ProviderCredentials::new(Some("google-key".into()), format!("{base}{google}")),
        secondary: ProviderCredentials::new(Some("tmap-key".into()), format!("{base}{tmap}")),
    }
}

async fn zero_results() -> Json<serde_json::Value> {
    Json(json!({ "status": "ZERO_RESULTS", "routes": [] }))
}

async fn google_ok() -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "routes": [{
            "overview_polyline": { "points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@" },
            "legs": [{
                "distance": { "text": "1.2 km", "value": 1200 },
                "duration": { "text": "15 mins", "value": 900 },
                "steps": []
            }]
        }]
    }))
}

async fn tmap_ok(headers: HeaderMap) -> impl IntoResponse {
    if headers.get("appKey").and_then(|v| v.to_str().ok()) != Some("tmap-key") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad key" })));
    }
    (
        StatusCode::OK,
        Json(json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [127.0, 37.5] },
                    "properties": { "totalDistance": 1120, "totalTime": 800, "description": "Depart" }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "LineString", "coordinates": [[127.0, 37.5], [127.0, 37.505], [127.0, 37.51]] },
                    "properties": { "distance": 1120 }
                }
            ]
        })),
    )
}

async fn service_unavailable() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

#[tokio::test]
async fn test_http_primary_success() -> anyhow::Result<()> {
    let base = spawn_mock(Router::new().route("/google", get(google_ok))).await?;
    let resolver = RouteResolver::from_config(&config(&base, "/google", "/tmap"));

    let route = resolver.resolve(&seoul_request()).await;

    assert_eq!(route.provider_used, "primary");
    assert_eq!(route.path.len(), 3);
    assert_eq!(route.distance_meters, 1200.0);
    assert!((route.exercise_duration_minutes - 7.2).abs() < 1e-9);
    Ok(())
}

#[tokio::test]
async fn test_http_zero_results_uses_secondary() -> anyhow::Result<()> {
    let base = spawn_mock(
        Router::new()
            .route("/google", get(zero_results))
            .route("/tmap", post(tmap_ok)),
    )
    .await?;
    let resolver = RouteResolver::from_config(&config(&base, "/google", "/tmap"));

    let route = resolver.resolve(&seoul_request()).await;

    assert_eq!(route.provider_used, "secondary");
    assert_eq!(route.path.len(), 3);
    assert_eq!(route.distance_meters, 1120.0);
    assert_eq!(route.instructions[0].text, "Depart");
    assert!((route.bounds.north - 37.51).abs() < 1e-12);
    Ok(())
}

#[tokio::test]
async fn test_http_secondary_outage_falls_back() -> anyhow::Result<()> {
    let base = spawn_mock(
        Router::new()
            .route("/google", get(zero_results))
            .route("/tmap", post(service_unavailable)),
    )
    .await?;
    let resolver = RouteResolver::from_config(&config(&base, "/google", "/tmap"));

    let route = resolver.resolve(&seoul_request()).await;

    assert!(route.is_fallback());
    assert!(route.path.len() >= 20);
    Ok(())
}

#[tokio::test]
async fn test_missing_credentials_count_as_failure() -> anyhow::Result<()> {
    let base = spawn_mock(Router::new().route("/google", get(google_ok))).await?;
    let mut config = config(&base, "/google", "/tmap");
    config.primary.api_key = None;
    let resolver = RouteResolver::from_config(&config);

    let route = resolver.resolve(&seoul_request()).await;

    assert!(route.is_fallback());
    Ok(())
}
