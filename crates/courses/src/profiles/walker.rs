//! Walker activity profile.

use super::{ActivityProfile, TravelMode};

/// Profile for brisk walks: 5 km/h reference speed, pedestrian routing.
#[derive(Debug, Clone)]
pub struct WalkerProfile {
    reference_speed: f64,
}

impl Default for WalkerProfile {
    fn default() -> Self {
        Self::new(5.0)
    }
}

impl WalkerProfile {
    pub const fn new(reference_speed_kmh: f64) -> Self {
        Self {
            reference_speed: reference_speed_kmh,
        }
    }
}

impl ActivityProfile for WalkerProfile {
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
    fn test_default_pace() {
        let profile = WalkerProfile::default();
        assert!((profile.reference_pace_min_per_km() - 12.0).abs() < 1e-9);
    }
}
