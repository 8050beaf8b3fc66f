use geo::geometry::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint as GpxWaypoint};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::errors::ExportError;
use crate::models::LatLng;

/// Finalized record of one run, emitted on completion or explicit stop.
///
/// `heart_rate_samples` and `path` hold one sample per simulated second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub course_id: String,
    pub course_name: String,
    pub distance_meters: f64,
    pub elapsed_seconds: f64,
    pub avg_speed_kmh: f64,
    pub max_speed_kmh: f64,
    pub calories_kcal: f64,
    pub heart_rate_samples: Vec<u32>,
    pub step_count: u64,
    pub path: Vec<LatLng>,
    pub started_at: OffsetDateTime,
    pub finished_at: OffsetDateTime,
    pub completed: bool,
}

impl SessionSummary {
    /// Serialises the sampled path as a GPX 1.1 track.
    ///
    /// Sample `i` is stamped `started_at + i` seconds.
    pub fn to_gpx(&self) -> Result<Vec<u8>, ExportError> {
        let mut segment = TrackSegment::new();
        segment.points = self
            .path
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let mut wpt = GpxWaypoint::new(Point::new(p.lng, p.lat));
                wpt.time = Some((self.started_at + Duration::seconds(i as i64)).into());
                wpt
            })
            .collect();

        let mut track = Track::new();
        track.name = Some(self.course_name.clone());
        track.segments.push(segment);

        let doc = Gpx {
            version: GpxVersion::Gpx11,
            creator: Some("virtual-course".to_string()),
            tracks: vec![track],
            ..Default::default()
        };

        let mut out = Vec::new();
        gpx::write(&doc, &mut out).map_err(|e| ExportError(e.to_string()))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> SessionSummary {
        let now = OffsetDateTime::now_utc();
        SessionSummary {
            course_id: "hangang-1500".into(),
            course_name: "Hangang & Bridge".into(),
            distance_meters: 20.0,
            elapsed_seconds: 2.0,
            avg_speed_kmh: 36.0,
            max_speed_kmh: 36.0,
            calories_kcal: 0.5,
            heart_rate_samples: vec![95, 96, 97],
            step_count: 26,
            path: vec![
                LatLng::new(37.5, 127.0),
                LatLng::new(37.50009, 127.0),
                LatLng::new(37.50018, 127.0),
            ],
            started_at: now,
            finished_at: now + Duration::seconds(2),
            completed: false,
        }
    }

    #[test]
    fn test_gpx_export_reads_back() {
        let bytes = summary().to_gpx().unwrap();
        let parsed = gpx::read(bytes.as_slice()).unwrap();
        assert_eq!(parsed.tracks.len(), 1);
        assert_eq!(parsed.tracks[0].name.as_deref(), Some("Hangang & Bridge"));
        let points = &parsed.tracks[0].segments[0].points;
        assert_eq!(points.len(), 3);
        assert!((points[0].point().y() - 37.5).abs() < 1e-9);
        assert!(points.iter().all(|p| p.time.is_some()));
    }
}
