//! HTTP request handlers for the courses API.

pub mod candidates;
pub mod courses;
pub mod routes;
pub mod sessions;

use axum::http::StatusCode;

pub use candidates::{CandidatesQuery, get_candidates};
pub use courses::{CourseSummary, PositionQuery, get_course, get_course_position, list_courses};
pub use routes::{ResolveRouteRequest, resolve_route};
pub use sessions::{
    SessionView, StartSessionRequest, download_session_gpx, get_session, pause_session,
    resume_session, start_session, stop_session,
};

/// Health check endpoint.
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
