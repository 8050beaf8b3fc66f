//! Nearby course suggestions.

use axum::{extract::Query, response::Json};
use courses::{
    candidates::CandidateCourseGenerator,
    models::{CourseCandidate, LatLng},
    profiles::ActivityType,
};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::errors::AppError;

fn default_radius() -> f64 {
    2000.0
}

/// `range` compares with `<`/`>`, which NaN slips through.
fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("finite").with_message("must be a finite number".into()))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CandidatesQuery {
    #[validate(
        custom(function = "validate_finite"),
        range(min = -90.0, max = 90.0, message = "lat must be between -90 and 90")
    )]
    pub lat: f64,
    #[validate(
        custom(function = "validate_finite"),
        range(min = -180.0, max = 180.0, message = "lng must be between -180 and 180")
    )]
    pub lng: f64,
    #[serde(default = "default_radius")]
    #[validate(
        custom(function = "validate_finite"),
        range(min = 500.0, message = "radius must be at least 500 meters")
    )]
    pub radius: f64,
    #[serde(default)]
    pub activity: ActivityType,
}

/// Round-trip course candidates around a point.
pub async fn get_candidates(
    Query(query): Query<CandidatesQuery>,
) -> Result<Json<Vec<CourseCandidate>>, AppError> {
    query.validate()?;

    let candidates = CandidateCourseGenerator::for_activity(query.activity)
        .generate(LatLng::new(query.lat, query.lng), query.radius);
    Ok(Json(candidates))
}
