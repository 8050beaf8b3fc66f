//! Route resolution handler.

use std::borrow::Cow;
use std::sync::Arc;

use axum::{Extension, response::Json};
use courses::{
    models::{LatLng, RouteResult},
    profiles::ActivityType,
    routing::{RouteRequest, RouteResolver},
};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::errors::AppError;

/// Most intermediate stops accepted per request.
const MAX_WAYPOINTS: usize = 8;

#[derive(Debug, Deserialize, Validate)]
pub struct ResolveRouteRequest {
    #[validate(custom(function = "validate_point"))]
    pub start: LatLng,
    #[validate(custom(function = "validate_point"))]
    pub end: LatLng,
    #[serde(default)]
    pub activity: ActivityType,
    #[serde(default)]
    #[validate(custom(function = "validate_waypoints"))]
    pub waypoints: Vec<LatLng>,
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn validate_point(point: &LatLng) -> Result<(), ValidationError> {
    if point.is_valid() {
        Ok(())
    } else {
        Err(invalid(
            "coordinate",
            "Coordinates must be within lat [-90, 90] and lng [-180, 180]",
        ))
    }
}

fn validate_waypoints(waypoints: &[LatLng]) -> Result<(), ValidationError> {
    if waypoints.len() > MAX_WAYPOINTS {
        return Err(invalid("waypoints", "At most 8 waypoints are allowed"));
    }
    waypoints.iter().try_for_each(validate_point)
}

/// Resolve a route through the provider chain.
///
/// Always succeeds for valid coordinates; `provider_used` tells the caller
/// whether the result is a straight-line fallback.
pub async fn resolve_route(
    Extension(resolver): Extension<Arc<RouteResolver>>,
    Json(req): Json<ResolveRouteRequest>,
) -> Result<Json<RouteResult>, AppError> {
    req.validate()?;

    let request = RouteRequest::new(req.start, req.end, req.activity).with_waypoints(req.waypoints);
    let route = resolver.resolve(&request).await;
    if route.is_fallback() {
        tracing::warn!("Serving straight-line fallback route");
    }
    Ok(Json(route))
}
