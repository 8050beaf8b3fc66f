//! Built-in course handlers.

use axum::{
    extract::{Path, Query},
    response::Json,
};
use courses::{catalog, interpolation::interpolate, models::CourseDefinition, models::Position};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Course listing entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: String,
    pub name: String,
    pub total_distance_meters: f64,
    pub target_duration_seconds: f64,
    pub waypoint_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct PositionQuery {
    /// Percent of the course; out-of-range values are clamped.
    pub progress: f64,
}

/// List the built-in courses.
pub async fn list_courses() -> Json<Vec<CourseSummary>> {
    let summaries = catalog::all()
        .iter()
        .map(|c| CourseSummary {
            id: c.id().to_string(),
            name: c.name().to_string(),
            total_distance_meters: c.total_distance_meters(),
            target_duration_seconds: c.target_duration_seconds(),
            waypoint_count: c.path().len(),
        })
        .collect();
    Json(summaries)
}

/// Get a built-in course with its full path and pace plan.
pub async fn get_course(Path(id): Path<String>) -> Result<Json<CourseDefinition>, AppError> {
    let course = catalog::course(&id)?;
    Ok(Json(course.as_ref().clone()))
}

/// Interpolated position on a course at a progress percentage.
pub async fn get_course_position(
    Path(id): Path<String>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<Position>, AppError> {
    let course = catalog::course(&id)?;
    let position = interpolate(course.path(), query.progress).ok_or(AppError::NotFound)?;
    Ok(Json(position))
}
