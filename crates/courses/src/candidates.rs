//! Nearby round-trip course suggestions.
//!
//! Candidates are built from a fixed sampling pattern around the center, so they
//! need no provider and are reproducible for the same input.

use crate::geo_math::{haversine_distance, offset_meters, snap_to_grid};
use crate::models::{CourseCandidate, DifficultyTier, LatLng};
use crate::profiles::{ActivityType, exercise_duration_minutes};

/// Sampling radii, meters.
const RADII_M: [f64; 6] = [500.0, 1000.0, 1500.0, 2000.0, 2500.0, 3000.0];
/// Compass bearings sampled at every radius, degrees.
const BEARINGS_DEG: [f64; 8] = [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0];

const EASY_MAX_M: f64 = 1500.0;
const MODERATE_MAX_M: f64 = 3000.0;

pub const MIN_CANDIDATES: usize = 5;
pub const MAX_CANDIDATES: usize = 8;

/// Out-and-back padding used when sampling yields too few candidates:
/// `(north, east, one-way meters)`.
const PADDING: [(f64, f64, f64); 4] = [
    (1.0, 0.0, 1000.0),
    (0.0, 1.0, 2000.0),
    (-1.0, 0.0, 3000.0),
    (0.0, -1.0, 4000.0),
];

#[derive(Debug, Clone, Copy)]
struct Sample {
    point: LatLng,
    distance: f64,
}

/// Generates round-trip candidates around a center point.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateCourseGenerator {
    activity: ActivityType,
}

impl CandidateCourseGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `activity`'s reference speed for the time estimate.
    pub fn for_activity(activity: ActivityType) -> Self {
        Self { activity }
    }

    /// Between 5 and 8 candidates for `center`, sampling no farther than
    /// `radius_meters`.
    ///
    /// Points are sampled radius by radius in eight directions, snapped to a
    /// 0.001° grid and bucketed by their true distance from the center.
    /// Consecutive points of a bucket form a `center -> a -> b -> center` loop.
    /// Loops are taken round-robin across buckets so short and long options are
    /// both represented.
    pub fn generate(&self, center: LatLng, radius_meters: f64) -> Vec<CourseCandidate> {
        let samples = self.sample(center, radius_meters);

        let mut pools: [Vec<Sample>; 3] = Default::default();
        for sample in samples {
            pools[tier_index(tier_for(sample.distance))].push(sample);
        }

        let loops: Vec<Vec<CourseCandidate>> = pools
            .iter()
            .map(|pool| {
                pool.windows(2)
                    .map(|pair| self.round_trip(center, &pair[0], &pair[1]))
                    .collect()
            })
            .collect();

        let mut candidates = Vec::with_capacity(MAX_CANDIDATES);
        let longest = loops.iter().map(Vec::len).max().unwrap_or(0);
        'interleave: for i in 0..longest {
            for pool in &loops {
                if let Some(candidate) = pool.get(i) {
                    candidates.push(candidate.clone());
                    if candidates.len() == MAX_CANDIDATES {
                        break 'interleave;
                    }
                }
            }
        }

        let mut round = 0;
        while candidates.len() < MIN_CANDIDATES {
            let (north, east, meters) = PADDING[round % PADDING.len()];
            let scale = (round / PADDING.len() + 1) as f64;
            candidates.push(self.out_and_back(center, north * meters * scale, east * meters * scale));
            round += 1;
        }

        tracing::debug!(
            lat = center.lat,
            lng = center.lng,
            radius_meters,
            count = candidates.len(),
            padded = round,
            "Generated course candidates"
        );
        candidates
    }

    fn sample(&self, center: LatLng, radius_meters: f64) -> Vec<Sample> {
        let mut samples: Vec<Sample> = Vec::new();
        for radius in RADII_M.iter().filter(|r| **r <= radius_meters) {
            for bearing in BEARINGS_DEG {
                let (sin, cos) = bearing.to_radians().sin_cos();
                let point = snap_to_grid(offset_meters(center, radius * cos, radius * sin));
                if !point.is_valid() || samples.iter().any(|s| s.point == point) {
                    continue;
                }
                let distance = haversine_distance(center, point);
                if distance > 0.0 {
                    samples.push(Sample { point, distance });
                }
            }
        }
        samples
    }

    fn round_trip(&self, center: LatLng, a: &Sample, b: &Sample) -> CourseCandidate {
        let total = a.distance + haversine_distance(a.point, b.point) + b.distance;
        CourseCandidate {
            center,
            endpoints: vec![a.point, b.point],
            difficulty_tier: tier_for(a.distance.max(b.distance)),
            total_distance_meters: total,
            estimated_time_label: self.time_label(total),
        }
    }

    fn out_and_back(&self, center: LatLng, north_m: f64, east_m: f64) -> CourseCandidate {
        let turn = offset_meters(center, north_m, east_m);
        let one_way = haversine_distance(center, turn);
        let total = one_way * 2.0;
        CourseCandidate {
            center,
            endpoints: vec![turn],
            difficulty_tier: tier_for(one_way),
            total_distance_meters: total,
            estimated_time_label: self.time_label(total),
        }
    }

    fn time_label(&self, total_meters: f64) -> String {
        let minutes = exercise_duration_minutes(self.activity.profile(), total_meters);
        format!("~{} min", minutes.round() as u64)
    }
}

fn tier_for(distance: f64) -> DifficultyTier {
    if distance <= EASY_MAX_M {
        DifficultyTier::Easy
    } else if distance <= MODERATE_MAX_M {
        DifficultyTier::Moderate
    } else {
        DifficultyTier::Hard
    }
}

fn tier_index(tier: DifficultyTier) -> usize {
    match tier {
        DifficultyTier::Easy => 0,
        DifficultyTier::Moderate => 1,
        DifficultyTier::Hard => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEOUL: LatLng = LatLng::new(37.5665, 126.978);

    #[test]
    fn test_count_bounds_for_many_radii() {
        let generator = CandidateCourseGenerator::new();
        for radius in [500.0, 750.0, 1000.0, 1500.0, 2000.0, 3000.0, 10_000.0] {
            let candidates = generator.generate(SEOUL, radius);
            assert!(
                (MIN_CANDIDATES..=MAX_CANDIDATES).contains(&candidates.len()),
                "radius {radius}: {} candidates",
                candidates.len()
            );
        }
    }

    #[test]
    fn test_small_radius_only_easy() {
        let candidates = CandidateCourseGenerator::new().generate(SEOUL, 500.0);
        assert!(candidates.iter().all(|c| c.difficulty_tier == DifficultyTier::Easy));
        for c in &candidates {
            assert_eq!(c.endpoints.len(), 2);
            assert!(c.total_distance_meters > 1000.0);
            assert!(c.estimated_time_label.starts_with('~'));
        }
    }

    #[test]
    fn test_large_radius_mixes_tiers() {
        let candidates = CandidateCourseGenerator::new().generate(SEOUL, 3000.0);
        assert_eq!(candidates.len(), MAX_CANDIDATES);
        assert_eq!(candidates[0].difficulty_tier, DifficultyTier::Easy);
        assert_eq!(candidates[1].difficulty_tier, DifficultyTier::Moderate);
    }

    #[test]
    fn test_samples_are_snapped() {
        let candidates = CandidateCourseGenerator::new().generate(SEOUL, 1000.0);
        for p in candidates.iter().flat_map(|c| &c.endpoints) {
            assert!(((p.lat * 1000.0).round() - p.lat * 1000.0).abs() < 1e-6);
            assert!(((p.lng * 1000.0).round() - p.lng * 1000.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_tiny_radius_is_padded() {
        let candidates = CandidateCourseGenerator::new().generate(SEOUL, 100.0);
        assert_eq!(candidates.len(), MIN_CANDIDATES);
        assert_eq!(candidates[0].difficulty_tier, DifficultyTier::Easy);
        assert_eq!(candidates[3].difficulty_tier, DifficultyTier::Hard);
        assert_eq!(candidates[0].endpoints.len(), 1);
        assert!((candidates[0].total_distance_meters - 2000.0).abs() < 20.0);
    }

    #[test]
    fn test_deterministic() {
        let generator = CandidateCourseGenerator::new();
        assert_eq!(generator.generate(SEOUL, 2000.0), generator.generate(SEOUL, 2000.0));
    }

    #[test]
    fn test_time_label_uses_reference_speed() {
        let generator = CandidateCourseGenerator::for_activity(ActivityType::Run);
        assert_eq!(generator.time_label(2500.0), "~15 min");
    }
}
