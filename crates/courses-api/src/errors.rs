use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use courses::errors::{CourseError, ExportError, SimulationError};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Course(#[from] CourseError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl From<ValidationErrors> for AppError {
    fn from(e: ValidationErrors) -> Self {
        let mut messages: Vec<String> = e
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(m) => m.to_string(),
                    None => format!("Invalid {field}"),
                })
            })
            .collect();
        messages.sort();
        AppError::InvalidInput(messages.join(", "))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Course(CourseError::UnknownCourse(_)) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::Course(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Simulation(e) => (StatusCode::CONFLICT, e.to_string()),
            AppError::Export(e) => {
                error!("Export error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
