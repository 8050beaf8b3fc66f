//! Small geodesy helpers shared by the interpolator, the fallback synthesiser and
//! the candidate generator.

use geo::{Distance as _, Haversine, geometry::Point};

use crate::models::{Bounds, LatLng};

/// Meters per degree of latitude used for meter/degree offset conversion.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Great-circle distance between two points in meters.
pub fn haversine_distance(a: LatLng, b: LatLng) -> f64 {
    Haversine.distance(to_point(a), to_point(b))
}

/// Total length of a polyline in meters.
pub fn path_length(path: &[LatLng]) -> f64 {
    path.windows(2)
        .map(|w| haversine_distance(w[0], w[1]))
        .sum()
}

/// Running distance along a polyline, starting at 0 for the first point.
pub fn cumulative_distances(path: &[LatLng]) -> Vec<f64> {
    let mut total = 0.0;
    let mut out = Vec::with_capacity(path.len());
    for (i, point) in path.iter().enumerate() {
        if i > 0 {
            total += haversine_distance(path[i - 1], *point);
        }
        out.push(total);
    }
    out
}

/// Moves `origin` by `north_m` meters north and `east_m` meters east.
///
/// Uses the flat-earth approximation `Δlat = d / 111320`,
/// `Δlng = d / (111320 * cos(lat))`, which is accurate enough at course scale.
pub fn offset_meters(origin: LatLng, north_m: f64, east_m: f64) -> LatLng {
    let cos_lat = origin.lat.to_radians().cos().abs().max(1e-6);
    LatLng {
        lat: origin.lat + north_m / METERS_PER_DEGREE,
        lng: origin.lng + east_m / (METERS_PER_DEGREE * cos_lat),
    }
}

/// Rounds a point to the nearest 0.001° cell (~100 m).
pub fn snap_to_grid(point: LatLng) -> LatLng {
    LatLng {
        lat: (point.lat * 1000.0).round() / 1000.0,
        lng: (point.lng * 1000.0).round() / 1000.0,
    }
}

/// Linear blend between two points; `t` is not clamped.
pub fn lerp(a: LatLng, b: LatLng, t: f64) -> LatLng {
    LatLng {
        lat: a.lat + (b.lat - a.lat) * t,
        lng: a.lng + (b.lng - a.lng) * t,
    }
}

/// Bounding box of a set of points, or `None` when empty.
pub fn bounds_of(points: &[LatLng]) -> Option<Bounds> {
    let first = points.first()?;
    let mut bounds = Bounds {
        north: first.lat,
        south: first.lat,
        east: first.lng,
        west: first.lng,
    };
    for p in &points[1..] {
        bounds.north = bounds.north.max(p.lat);
        bounds.south = bounds.south.min(p.lat);
        bounds.east = bounds.east.max(p.lng);
        bounds.west = bounds.west.min(p.lng);
    }
    Some(bounds)
}

fn to_point(p: LatLng) -> Point<f64> {
    Point::new(p.lng, p.lat)
}
