//! Navigation route resolution.
//!
//! [`RouteResolver`] walks an ordered list of [`RouteProvider`]s and normalises
//! the first success into a [`RouteResult`](crate::models::RouteResult). When no
//! provider can help it synthesises a straight-line route instead, so
//! resolution never fails for valid coordinates.

mod fallback;
pub mod polyline;
mod provider;
pub mod providers;
mod resolver;

use serde::{Deserialize, Serialize};

use crate::models::LatLng;
use crate::profiles::ActivityType;

pub use fallback::{FALLBACK_MIN_SAMPLES, FALLBACK_SAMPLE_SPACING_M, synthesize_straight_line};
pub use provider::{ProviderRoute, RouteProvider};
pub use resolver::RouteResolver;

/// `provider_used` tag of a synthesised straight-line route.
pub const FALLBACK_PROVIDER: &str = "fallback-straight";

/// A point-to-point routing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: LatLng,
    pub end: LatLng,
    #[serde(default)]
    pub activity: ActivityType,
    /// Intermediate stops, visited in order.
    #[serde(default)]
    pub waypoints: Vec<LatLng>,
}

impl RouteRequest {
    pub fn new(start: LatLng, end: LatLng, activity: ActivityType) -> Self {
        Self {
            start,
            end,
            activity,
            waypoints: Vec::new(),
        }
    }

    pub fn with_waypoints(mut self, waypoints: Vec<LatLng>) -> Self {
        self.waypoints = waypoints;
        self
    }

    /// Start, waypoints and end in travel order.
    pub fn stops(&self) -> Vec<LatLng> {
        let mut stops = Vec::with_capacity(self.waypoints.len() + 2);
        stops.push(self.start);
        stops.extend_from_slice(&self.waypoints);
        stops.push(self.end);
        stops
    }
}
