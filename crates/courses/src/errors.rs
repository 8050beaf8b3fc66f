use thiserror::Error;

/// Rejection reasons for a malformed course, raised before any simulation starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CourseError {
    #[error("Course path is empty")]
    EmptyPath,

    #[error("Course path needs at least 2 points, got {0}")]
    TooFewPoints(usize),

    #[error("Course path must start at 0 m, starts at {0} m")]
    PathNotStartingAtZero(f64),

    #[error("Cumulative distance decreases at waypoint {index} ({previous} m -> {current} m)")]
    NonMonotonicDistance {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("Path ends at {path_end} m but course distance is {total} m")]
    PathDistanceMismatch { path_end: f64, total: f64 },

    #[error("Course has no pace segments")]
    NoSegments,

    #[error("Course distance must be positive and finite, got {0} m")]
    InvalidTotalDistance(f64),

    #[error("Pace segment {index} spans [{start}, {end}] m; end must be after start")]
    EmptySegment { index: usize, start: f64, end: f64 },

    #[error("Gap after pace segment {index}: ends at {end} m, next starts at {start} m")]
    SegmentGap { index: usize, end: f64, start: f64 },

    #[error("Pace segments span [{start}, {end}] m instead of [0, {total}] m")]
    SegmentsDoNotSpanCourse { start: f64, end: f64, total: f64 },

    #[error("Pace segment {index} has invalid pace {pace} min/km")]
    InvalidPace { index: usize, pace: f64 },

    #[error("Target duration must be positive, got {0} s")]
    InvalidTargetDuration(f64),

    #[error("Invalid coordinate ({lat}, {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("Unknown course: {0}")]
    UnknownCourse(String),
}

/// Failure classes reported by an external directions provider.
///
/// Only [`ProviderError::NoRoute`] lets the resolver try the next provider; every
/// other class sends it straight to fallback synthesis.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider found no route")]
    NoRoute,

    #[error("Provider quota exceeded")]
    QuotaExceeded,

    #[error("Provider credentials missing or rejected")]
    InvalidCredentials,

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Provider timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Could not decode provider response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Whether the chain should move on to the next provider.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProviderError::NoRoute)
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Decode(e.to_string())
    }
}

/// Illegal transitions of the tick controller state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("No course is active")]
    NoActiveCourse,

    #[error("A course is already active; stop it before starting another")]
    AlreadyActive,

    #[error("Simulation is not running")]
    NotRunning,

    #[error("Simulation is not paused")]
    NotPaused,

    #[error("Tick interval must be at least 1 ms, got {0:?}")]
    InvalidTickInterval(std::time::Duration),
}

/// Failure while serialising a session for export.
#[derive(Error, Debug)]
#[error("GPX export failed: {0}")]
pub struct ExportError(pub String);
