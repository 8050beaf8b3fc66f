//! Shared data model: geographic paths, courses, resolved routes and course candidates.

use serde::{Deserialize, Serialize};

use crate::errors::CourseError;

/// Tolerance used when comparing authored distances, in meters.
const DISTANCE_EPSILON_M: f64 = 0.5;

/// A bare geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both components are finite and within WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    pub(crate) fn validated(self) -> Result<Self, CourseError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(CourseError::InvalidCoordinate {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

/// A point on a course annotated with its distance from the start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lng: f64,
    pub cumulative_distance_meters: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Waypoint {
    pub fn new(lat: f64, lng: f64, cumulative_distance_meters: f64) -> Self {
        Self {
            lat,
            lng,
            cumulative_distance_meters,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn lat_lng(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// Interpolated position along a course path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
    pub cumulative_distance_meters: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Position {
    pub fn lat_lng(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

impl From<&Waypoint> for Position {
    fn from(w: &Waypoint) -> Self {
        Self {
            lat: w.lat,
            lng: w.lng,
            cumulative_distance_meters: w.cumulative_distance_meters,
            label: w.label.clone(),
        }
    }
}

/// A distance interval of a course assigned a target pace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaceSegment {
    pub start_distance: f64,
    pub end_distance: f64,
    pub pace_min_per_km: f64,
    pub description: String,
}

impl PaceSegment {
    pub fn new(
        start_distance: f64,
        end_distance: f64,
        pace_min_per_km: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            start_distance,
            end_distance,
            pace_min_per_km,
            description: description.into(),
        }
    }

    /// Target speed of this segment in km/h.
    pub fn target_speed_kmh(&self) -> f64 {
        60.0 / self.pace_min_per_km
    }

    /// Half-open membership test `[start, end)`.
    pub fn contains(&self, distance: f64) -> bool {
        distance >= self.start_distance && distance < self.end_distance
    }
}

/// Immutable description of a course: path, pace plan and target duration.
///
/// Only constructible through [`CourseDefinition::new`] (or deserialisation,
/// which runs the same checks), so every instance upholds the path and segment
/// invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CourseDefinitionData")]
pub struct CourseDefinition {
    id: String,
    name: String,
    total_distance_meters: f64,
    path: Vec<Waypoint>,
    segments: Vec<PaceSegment>,
    target_duration_seconds: f64,
}

#[derive(Deserialize)]
struct CourseDefinitionData {
    id: String,
    name: String,
    total_distance_meters: f64,
    path: Vec<Waypoint>,
    segments: Vec<PaceSegment>,
    target_duration_seconds: f64,
}

impl TryFrom<CourseDefinitionData> for CourseDefinition {
    type Error = CourseError;

    fn try_from(data: CourseDefinitionData) -> Result<Self, Self::Error> {
        CourseDefinition::new(
            data.id,
            data.name,
            data.total_distance_meters,
            data.path,
            data.segments,
            data.target_duration_seconds,
        )
    }
}

impl CourseDefinition {
    /// Validates and builds a course.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        total_distance_meters: f64,
        path: Vec<Waypoint>,
        segments: Vec<PaceSegment>,
        target_duration_seconds: f64,
    ) -> Result<Self, CourseError> {
        if !(target_duration_seconds.is_finite() && target_duration_seconds > 0.0) {
            return Err(CourseError::InvalidTargetDuration(target_duration_seconds));
        }
        validate_path(&path, total_distance_meters)?;
        validate_segments(&segments, total_distance_meters)?;

        Ok(Self {
            id: id.into(),
            name: name.into(),
            total_distance_meters,
            path,
            segments,
            target_duration_seconds,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_distance_meters(&self) -> f64 {
        self.total_distance_meters
    }

    pub fn path(&self) -> &[Waypoint] {
        &self.path
    }

    pub fn segments(&self) -> &[PaceSegment] {
        &self.segments
    }

    pub fn target_duration_seconds(&self) -> f64 {
        self.target_duration_seconds
    }

    /// Pace segment covering `distance`; the last segment also owns the finish line.
    pub fn segment_at(&self, distance: f64) -> &PaceSegment {
        let last = self.segments.len() - 1;
        self.segments
            .iter()
            .find(|s| s.contains(distance))
            .unwrap_or(if distance < self.segments[0].start_distance {
                &self.segments[0]
            } else {
                &self.segments[last]
            })
    }
}

fn validate_path(path: &[Waypoint], total: f64) -> Result<(), CourseError> {
    if path.is_empty() {
        return Err(CourseError::EmptyPath);
    }
    if path.len() < 2 {
        return Err(CourseError::TooFewPoints(path.len()));
    }
    if !(total.is_finite() && total > 0.0) {
        return Err(CourseError::InvalidTotalDistance(total));
    }
    for w in path {
        LatLng::new(w.lat, w.lng).validated()?;
    }

    let start = path[0].cumulative_distance_meters;
    if !start.is_finite() || start.abs() > DISTANCE_EPSILON_M {
        return Err(CourseError::PathNotStartingAtZero(start));
    }
    for (i, pair) in path.windows(2).enumerate() {
        let (previous, current) = (pair[0].cumulative_distance_meters, pair[1].cumulative_distance_meters);
        if current < previous || !current.is_finite() {
            return Err(CourseError::NonMonotonicDistance {
                index: i + 1,
                previous,
                current,
            });
        }
    }

    let path_end = path[path.len() - 1].cumulative_distance_meters;
    if (path_end - total).abs() > DISTANCE_EPSILON_M {
        return Err(CourseError::PathDistanceMismatch { path_end, total });
    }
    Ok(())
}

fn validate_segments(segments: &[PaceSegment], total: f64) -> Result<(), CourseError> {
    let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
        return Err(CourseError::NoSegments);
    };

    for (index, s) in segments.iter().enumerate() {
        if !(s.pace_min_per_km.is_finite() && s.pace_min_per_km > 0.0) {
            return Err(CourseError::InvalidPace {
                index,
                pace: s.pace_min_per_km,
            });
        }
        let finite = s.start_distance.is_finite() && s.end_distance.is_finite();
        if !finite || s.end_distance <= s.start_distance {
            return Err(CourseError::EmptySegment {
                index,
                start: s.start_distance,
                end: s.end_distance,
            });
        }
    }
    for (index, pair) in segments.windows(2).enumerate() {
        if (pair[0].end_distance - pair[1].start_distance).abs() > f64::EPSILON {
            return Err(CourseError::SegmentGap {
                index,
                end: pair[0].end_distance,
                start: pair[1].start_distance,
            });
        }
    }

    if first.start_distance != 0.0 || (last.end_distance - total).abs() > DISTANCE_EPSILON_M {
        return Err(CourseError::SegmentsDoNotSpanCourse {
            start: first.start_distance,
            end: last.end_distance,
            total,
        });
    }
    Ok(())
}

/// A turn-by-turn instruction of a resolved route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub text: String,
    pub distance_label: String,
    pub start_location: LatLng,
    pub end_location: LatLng,
}

/// Geographic bounding box of a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// Normalised navigation route, whichever provider produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub path: Vec<LatLng>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub exercise_duration_minutes: f64,
    pub instructions: Vec<Instruction>,
    pub bounds: Bounds,
    pub provider_used: String,
}

impl RouteResult {
    /// True when the route came from straight-line synthesis rather than a provider.
    pub fn is_fallback(&self) -> bool {
        self.provider_used == crate::routing::FALLBACK_PROVIDER
    }
}

/// Difficulty tier of a candidate course, derived from its distance pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Easy,
    Moderate,
    Hard,
}

impl DifficultyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::Easy => "easy",
            DifficultyTier::Moderate => "moderate",
            DifficultyTier::Hard => "hard",
        }
    }
}

/// A nearby round-trip course suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseCandidate {
    pub center: LatLng,
    pub endpoints: Vec<LatLng>,
    pub difficulty_tier: DifficultyTier,
    pub total_distance_meters: f64,
    pub estimated_time_label: String,
}
