//! Simulation session handlers.

use axum::{
    Extension,
    extract::Path,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use courses::{
    catalog,
    simulation::{CoachingCue, SessionSummary, SimulationPhase, SimulationState},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{errors::AppError, sessions::SessionRegistry};

#[derive(Debug, Deserialize, Validate)]
pub struct StartSessionRequest {
    #[validate(length(min = 1, message = "course_id is required"))]
    pub course_id: String,
    #[validate(range(min = 20.0, max = 300.0, message = "body_weight_kg must be between 20 and 300"))]
    pub body_weight_kg: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub course_id: String,
    pub phase: SimulationPhase,
    pub state: Option<SimulationState>,
    pub latest_cue: Option<CoachingCue>,
}

/// Start simulating a built-in course.
pub async fn start_session(
    Extension(registry): Extension<SessionRegistry>,
    Json(req): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    req.validate()?;

    let course = catalog::course(&req.course_id)?;
    let session = registry.start(course, req.body_weight_kg).await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionView {
            session_id: session.id,
            course_id: session.course_id.clone(),
            phase: session.driver.phase(),
            state: session.driver.snapshot(),
            latest_cue: None,
        }),
    ))
}

/// Latest snapshot of a session.
pub async fn get_session(
    Extension(registry): Extension<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = registry.get(id).await.ok_or(AppError::NotFound)?;
    Ok(Json(SessionView {
        session_id: session.id,
        course_id: session.course_id.clone(),
        phase: session.driver.phase(),
        state: session.driver.snapshot(),
        latest_cue: session.latest_cue(),
    }))
}

pub async fn pause_session(
    Extension(registry): Extension<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let session = registry.get(id).await.ok_or(AppError::NotFound)?;
    session.driver.pause()?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn resume_session(
    Extension(registry): Extension<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let session = registry.get(id).await.ok_or(AppError::NotFound)?;
    session.driver.resume()?;
    Ok(StatusCode::NO_CONTENT)
}

/// Stop a session and return its summary.
///
/// Stopping an already finished session returns the same summary again.
pub async fn stop_session(
    Extension(registry): Extension<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, AppError> {
    let session = registry.get(id).await.ok_or(AppError::NotFound)?;
    let summary = session
        .driver
        .stop()
        .or_else(|| session.driver.summary())
        .ok_or_else(|| AppError::Conflict("Session has no summary".to_string()))?;
    tracing::info!(session_id = %id, distance = summary.distance_meters, "Session stopped");
    Ok(Json(summary))
}

/// Download a finished session as GPX.
pub async fn download_session_gpx(
    Extension(registry): Extension<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let session = registry.get(id).await.ok_or(AppError::NotFound)?;
    let summary = session
        .driver
        .summary()
        .ok_or_else(|| AppError::Conflict("Session is still running".to_string()))?;
    let bytes = summary.to_gpx()?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/gpx+xml"),
    );
    if let Ok(value) =
        HeaderValue::from_str(&format!("attachment; filename=\"{}.gpx\"", summary.course_id))
    {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((headers, bytes).into_response())
}
