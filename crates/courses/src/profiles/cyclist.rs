//! Cyclist activity profile.

use super::{ActivityProfile, TravelMode};

/// Profile for rides.
///
/// - Reference speed: 20 km/h
/// - Routed in bicycling mode; highways are already excluded by the provider
///   for that mode, so no explicit avoidance is requested
#[derive(Debug, Clone)]
pub struct CyclistProfile {
    reference_speed: f64,
}

impl Default for CyclistProfile {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl CyclistProfile {
    pub const fn new(reference_speed_kmh: f64) -> Self {
        Self {
            reference_speed: reference_speed_kmh,
        }
    }
}

impl ActivityProfile for CyclistProfile {
    fn reference_speed_kmh(&self) -> f64 {
        self.reference_speed
    }

    fn travel_mode(&self) -> TravelMode {
        TravelMode::Bicycling
    }

    fn avoid_highways_and_tolls(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = CyclistProfile::default();
        assert_eq!(profile.travel_mode(), TravelMode::Bicycling);
        assert!((profile.reference_pace_min_per_km() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_explicit_avoidance() {
        assert!(!CyclistProfile::default().avoid_highways_and_tolls());
    }
}
