pub mod errors;
pub mod handlers;
pub mod request_id;
pub mod sessions;

use std::sync::Arc;

use axum::{
    Extension, Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use courses::{
    config::{ResolverConfig, SimulationConfig},
    routing::RouteResolver,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};

use crate::{
    handlers::{
        download_session_gpx, get_candidates, get_course, get_course_position, get_session,
        health_check, list_courses, pause_session, resolve_route, resume_session, start_session,
        stop_session,
    },
    request_id::request_id_middleware,
    sessions::SessionRegistry,
};

pub fn create_router(resolver: RouteResolver, simulation: SimulationConfig) -> Router {
    let resolver = Arc::new(resolver);
    let registry = SessionRegistry::new(simulation);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health_check))
        // Built-in courses
        .route("/courses", get(list_courses))
        .route("/courses/{id}", get(get_course))
        .route("/courses/{id}/position", get(get_course_position))
        // Course discovery and routing
        .route("/candidates", get(get_candidates))
        .route("/routes/resolve", post(resolve_route))
        // Simulation sessions
        .route("/sessions", post(start_session))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}/pause", post(pause_session))
        .route("/sessions/{id}/resume", post(resume_session))
        .route("/sessions/{id}/stop", post(stop_session))
        .route("/sessions/{id}/gpx", get(download_session_gpx))
        .layer(Extension(resolver))
        .layer(Extension(registry))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(CompressionLayer::new())
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
}

pub async fn run_server(
    resolver_config: ResolverConfig,
    simulation: SimulationConfig,
    port: u16,
) -> anyhow::Result<()> {
    let resolver = RouteResolver::from_config(&resolver_config);
    let providers: Vec<&str> = resolver.provider_labels().collect();
    tracing::info!(?providers, "Route providers configured");

    let app = create_router(resolver, simulation);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    tracing::info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
