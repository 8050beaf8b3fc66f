//! Position along a course path for a given progress percentage.

use crate::models::{Position, Waypoint};

/// Interpolates a position at `progress_percent` along `path`.
///
/// Progress is clamped to `[0, 100]` and mapped onto the waypoint index space
/// (`idx = progress / 100 * (N - 1)`), so each path step receives an equal share
/// of progress regardless of its length. Latitude, longitude and cumulative
/// distance are blended linearly between the two neighbouring waypoints. A
/// waypoint label is carried only when the index lands exactly on that waypoint.
///
/// Returns `None` for an empty path.
pub fn interpolate(path: &[Waypoint], progress_percent: f64) -> Option<Position> {
    let last = path.len().checked_sub(1)?;
    if last == 0 {
        return Some(Position::from(&path[0]));
    }

    let progress = if progress_percent.is_nan() {
        0.0
    } else {
        progress_percent.clamp(0.0, 100.0)
    };
    let idx = progress / 100.0 * last as f64;
    let lower = (idx.floor() as usize).min(last);
    let fraction = idx - lower as f64;

    if lower == last || fraction == 0.0 {
        return Some(Position::from(&path[lower]));
    }

    let a = &path[lower];
    let b = &path[lower + 1];
    Some(Position {
        lat: a.lat + (b.lat - a.lat) * fraction,
        lng: a.lng + (b.lng - a.lng) * fraction,
        cumulative_distance_meters: a.cumulative_distance_meters
            + (b.cumulative_distance_meters - a.cumulative_distance_meters) * fraction,
        label: None,
    })
}
