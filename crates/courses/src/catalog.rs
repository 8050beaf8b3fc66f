//! Built-in courses and course construction from resolved routes.
//!
//! Every authored course goes through the same [`CourseDefinition::new`]
//! validation and is driven by the same simulator; the only per-course data is
//! the geometry, the pace plan and the target duration in [`TARGET_DURATIONS`].

use std::sync::{Arc, OnceLock};

use crate::errors::CourseError;
use crate::geo_math::cumulative_distances;
use crate::models::{CourseDefinition, LatLng, PaceSegment, RouteResult, Waypoint};
use crate::profiles::ActivityType;

/// Target duration per built-in course id, seconds.
pub const TARGET_DURATIONS: &[(&str, f64)] = &[
    ("hangang-riverside", 540.0),
    ("olympic-park-loop", 1080.0),
    ("namsan-circuit", 1800.0),
];

/// Share of a derived course spent warming up and cooling down.
const WARMUP_SHARE: f64 = 0.15;
const COOLDOWN_SHARE: f64 = 0.15;
/// Warm-up and cool-down run this much slower than the reference pace.
const EASY_PACE_FACTOR: f64 = 1.15;

struct AuthoredCourse {
    id: &'static str,
    name: &'static str,
    points: &'static [(f64, f64, Option<&'static str>)],
    /// `(share of distance where the segment ends, pace min/km, description)`
    plan: &'static [(f64, f64, &'static str)],
}

const AUTHORED: &[AuthoredCourse] = &[
    AuthoredCourse {
        id: "hangang-riverside",
        name: "Hangang Riverside",
        points: &[
            (37.5284, 126.9240, Some("Yeouinaru")),
            (37.5280, 126.9282, None),
            (37.5274, 126.9325, None),
            (37.5268, 126.9368, Some("Mapo Bridge")),
            (37.5262, 126.9409, Some("Turnaround")),
        ],
        plan: &[
            (0.2, 6.5, "Easy start along the river"),
            (0.8, 5.5, "Riverside tempo"),
            (1.0, 6.5, "Easy finish"),
        ],
    },
    AuthoredCourse {
        id: "olympic-park-loop",
        name: "Olympic Park Loop",
        points: &[
            (37.5206, 127.1152, Some("Peace Gate")),
            (37.5232, 127.1189, None),
            (37.5241, 127.1243, Some("Mongchon Moat")),
            (37.5219, 127.1291, None),
            (37.5185, 127.1280, Some("Rose Garden")),
            (37.5168, 127.1231, None),
            (37.5180, 127.1176, None),
            (37.5206, 127.1152, Some("Peace Gate")),
        ],
        plan: &[
            (0.15, 6.5, "Warm-up"),
            (0.5, 5.5, "Steady loop"),
            (0.85, 5.0, "Push past the moat"),
            (1.0, 6.5, "Cool-down"),
        ],
    },
    AuthoredCourse {
        id: "namsan-circuit",
        name: "Namsan Circuit",
        points: &[
            (37.5567, 126.9784, Some("Namsan Library")),
            (37.5538, 126.9820, None),
            (37.5508, 126.9862, None),
            (37.5484, 126.9911, Some("N Seoul Tower trail")),
            (37.5469, 126.9965, None),
            (37.5487, 127.0010, Some("National Theater")),
            (37.5520, 126.9992, None),
            (37.5549, 126.9945, None),
            (37.5571, 126.9896, Some("Cable car station")),
            (37.5582, 126.9838, None),
            (37.5567, 126.9784, Some("Namsan Library")),
        ],
        plan: &[
            (0.15, 7.0, "Climb warm-up"),
            (0.5, 6.0, "Hill section"),
            (0.85, 5.5, "Rolling descent"),
            (1.0, 7.0, "Cool-down"),
        ],
    },
];

/// Target duration for a built-in course id.
pub fn target_duration_seconds(id: &str) -> Option<f64> {
    TARGET_DURATIONS
        .iter()
        .find(|(course_id, _)| *course_id == id)
        .map(|(_, seconds)| *seconds)
}

/// All built-in courses, validated once.
pub fn all() -> &'static [Arc<CourseDefinition>] {
    static COURSES: OnceLock<Vec<Arc<CourseDefinition>>> = OnceLock::new();
    COURSES.get_or_init(|| {
        AUTHORED
            .iter()
            .filter_map(|authored| match build(authored) {
                Ok(course) => Some(Arc::new(course)),
                Err(e) => {
                    tracing::error!(course_id = authored.id, "Invalid built-in course: {}", e);
                    None
                }
            })
            .collect()
    })
}

/// Looks up a built-in course by id.
pub fn course(id: &str) -> Result<Arc<CourseDefinition>, CourseError> {
    all()
        .iter()
        .find(|c| c.id() == id)
        .cloned()
        .ok_or_else(|| CourseError::UnknownCourse(id.to_string()))
}

fn build(authored: &AuthoredCourse) -> Result<CourseDefinition, CourseError> {
    let target = target_duration_seconds(authored.id)
        .ok_or_else(|| CourseError::UnknownCourse(authored.id.to_string()))?;
    let coords: Vec<LatLng> = authored
        .points
        .iter()
        .map(|(lat, lng, _)| LatLng::new(*lat, *lng))
        .collect();
    let distances = cumulative_distances(&coords);
    let total = distances.last().copied().unwrap_or(0.0);

    let path = authored
        .points
        .iter()
        .zip(distances)
        .map(|((lat, lng, label), distance)| {
            let waypoint = Waypoint::new(*lat, *lng, distance);
            match label {
                Some(label) => waypoint.with_label(*label),
                None => waypoint,
            }
        })
        .collect();

    let mut segments = Vec::with_capacity(authored.plan.len());
    let mut start = 0.0;
    for (i, (share, pace, description)) in authored.plan.iter().enumerate() {
        let end = if i + 1 == authored.plan.len() {
            total
        } else {
            total * share
        };
        segments.push(PaceSegment::new(start, end, *pace, *description));
        start = end;
    }

    CourseDefinition::new(authored.id, authored.name, total, path, segments, target)
}

impl CourseDefinition {
    /// Builds a course from a resolved route.
    ///
    /// Waypoint distances are measured along the route path, the pace plan is a
    /// warm-up / main / cool-down split around the activity's reference pace, and
    /// the target duration is the route's exercise duration.
    pub fn from_route(
        id: impl Into<String>,
        name: impl Into<String>,
        route: &RouteResult,
        activity: ActivityType,
    ) -> Result<Self, CourseError> {
        let distances = cumulative_distances(&route.path);
        let total = distances.last().copied().unwrap_or(0.0);
        let last = route.path.len().saturating_sub(1);

        let path = route
            .path
            .iter()
            .zip(distances)
            .enumerate()
            .map(|(i, (point, distance))| {
                let waypoint = Waypoint::new(point.lat, point.lng, distance);
                match i {
                    0 => waypoint.with_label("Start"),
                    i if i == last => waypoint.with_label("Finish"),
                    _ => waypoint,
                }
            })
            .collect();

        let pace = activity.profile().reference_pace_min_per_km();
        let warmup_end = total * WARMUP_SHARE;
        let cooldown_start = total * (1.0 - COOLDOWN_SHARE);
        let segments = vec![
            PaceSegment::new(0.0, warmup_end, pace * EASY_PACE_FACTOR, "Warm-up"),
            PaceSegment::new(warmup_end, cooldown_start, pace, "Main"),
            PaceSegment::new(cooldown_start, total, pace * EASY_PACE_FACTOR, "Cool-down"),
        ];

        CourseDefinition::new(
            id,
            name,
            total,
            path,
            segments,
            route.exercise_duration_minutes * 60.0,
        )
    }
}
