//! Runner activity profile.

use super::{ActivityProfile, TravelMode};

/// Profile for running workouts.
///
/// - Reference speed: 10 km/h (6:00/km)
/// - Routed as a pedestrian, away from highways and tolls
#[derive(Debug, Clone)]
pub struct RunnerProfile {
    /// Reference speed in km/h.
    reference_speed: f64,
}

impl Default for RunnerProfile {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl RunnerProfile {
    pub const fn new(reference_speed_kmh: f64) -> Self {
        Self {
            reference_speed: reference_speed_kmh,
        }
    }
}

impl ActivityProfile for RunnerProfile {
    fn reference_speed_kmh(&self) -> f64 {
        self.reference_speed
    }

    fn travel_mode(&self) -> TravelMode {
        TravelMode::Walking
    }

    fn avoid_highways_and_tolls(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = RunnerProfile::default();
        assert!((profile.reference_pace_min_per_km() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_routes_on_foot() {
        let profile = RunnerProfile::default();
        assert_eq!(profile.travel_mode(), TravelMode::Walking);
        assert!(profile.avoid_highways_and_tolls());
    }
}
