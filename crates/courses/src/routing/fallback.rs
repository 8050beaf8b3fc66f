//! Straight-line route synthesis, used when no provider can produce a route.

use super::{FALLBACK_PROVIDER, RouteRequest};
use crate::geo_math::{bounds_of, cumulative_distances, lerp};
use crate::models::{Bounds, Instruction, LatLng, RouteResult};
use crate::profiles::exercise_duration_minutes;

/// Spacing between synthesised samples, meters.
pub const FALLBACK_SAMPLE_SPACING_M: f64 = 50.0;
/// Lower bound on the number of synthesised samples.
pub const FALLBACK_MIN_SAMPLES: usize = 20;

const CHECKPOINTS: usize = 5;

/// Builds a straight-line route through the request's stops.
///
/// The polyline is sampled every 50 m (never fewer than 20 points), carries
/// five evenly spaced instructions from "depart" to "arrive", and is tagged
/// [`FALLBACK_PROVIDER`]. Works for a zero-length round trip too.
pub fn synthesize_straight_line(request: &RouteRequest) -> RouteResult {
    let stops = request.stops();
    let stop_distances = cumulative_distances(&stops);
    let distance = stop_distances.last().copied().unwrap_or(0.0);

    let samples = ((distance / FALLBACK_SAMPLE_SPACING_M).ceil() as usize + 1)
        .max(FALLBACK_MIN_SAMPLES);
    let path: Vec<LatLng> = (0..samples)
        .map(|i| {
            let along = distance * i as f64 / (samples - 1) as f64;
            point_at(&stops, &stop_distances, along)
        })
        .collect();

    let checkpoints: Vec<LatLng> = (0..CHECKPOINTS)
        .map(|i| {
            let along = distance * i as f64 / (CHECKPOINTS - 1) as f64;
            point_at(&stops, &stop_distances, along)
        })
        .collect();
    let leg = distance / (CHECKPOINTS - 1) as f64;
    let instructions = checkpoints
        .iter()
        .enumerate()
        .map(|(i, &at)| {
            let next = checkpoints.get(i + 1).copied().unwrap_or(at);
            let text = match i {
                0 => "Depart toward the destination".to_string(),
                i if i == CHECKPOINTS - 1 => "Arrive at the destination".to_string(),
                i if i % 2 == 1 => "Continue straight".to_string(),
                _ => "Turn to stay on course".to_string(),
            };
            let leg_distance = if i == CHECKPOINTS - 1 { 0.0 } else { leg };
            Instruction {
                text,
                distance_label: distance_label(leg_distance),
                start_location: at,
                end_location: next,
            }
        })
        .collect();

    let bounds = bounds_of(&path).unwrap_or(Bounds {
        north: request.start.lat,
        south: request.start.lat,
        east: request.start.lng,
        west: request.start.lng,
    });
    let minutes = exercise_duration_minutes(request.activity.profile(), distance);

    RouteResult {
        path,
        distance_meters: distance,
        duration_seconds: minutes * 60.0,
        exercise_duration_minutes: minutes,
        instructions,
        bounds,
        provider_used: FALLBACK_PROVIDER.to_string(),
    }
}

/// Point `along` meters into the polyline `stops`.
fn point_at(stops: &[LatLng], distances: &[f64], along: f64) -> LatLng {
    for (i, pair) in stops.windows(2).enumerate() {
        let (from, to) = (distances[i], distances[i + 1]);
        if along <= to || i + 2 == stops.len() {
            let span = to - from;
            let t = if span > 0.0 {
                ((along - from) / span).clamp(0.0, 1.0)
            } else {
                0.0
            };
            return lerp(pair[0], pair[1], t);
        }
    }
    stops[0]
}

/// Human-readable distance, e.g. `"420 m"` or `"1.3 km"`.
pub(crate) fn distance_label(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}
