//! Configuration types for route resolution and workout simulation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::SimulationError;
use crate::physiology::DEFAULT_BODY_WEIGHT_KG;

/// Shortest tick cadence the controller accepts.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Recommended per-provider timeout.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(8);

pub const DEFAULT_GOOGLE_DIRECTIONS_ENDPOINT: &str =
    "https://maps.googleapis.com/maps/api/directions/json";
pub const DEFAULT_TMAP_ENDPOINT: &str =
    "https://apis.openapi.sk.com/tmap/routes/pedestrian?version=1";

/// Endpoint and key for one external directions provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCredentials {
    /// API key; `None` means the provider is configured but unusable.
    pub api_key: Option<String>,
    /// Base URL of the provider endpoint.
    pub endpoint: String,
}

impl ProviderCredentials {
    pub fn new(api_key: Option<String>, endpoint: impl Into<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            endpoint: endpoint.into(),
        }
    }
}

/// Configuration for the provider chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Timeout applied to each provider call.
    #[serde(with = "duration_secs")]
    pub provider_timeout: Duration,
    /// Primary (global) directions provider.
    pub primary: ProviderCredentials,
    /// Secondary (region-specialised) provider, tried only on "no route".
    pub secondary: ProviderCredentials,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            primary: ProviderCredentials::new(None, DEFAULT_GOOGLE_DIRECTIONS_ENDPOINT),
            secondary: ProviderCredentials::new(None, DEFAULT_TMAP_ENDPOINT),
        }
    }
}

impl ResolverConfig {
    /// Reads provider settings from the environment.
    ///
    /// - `GOOGLE_MAPS_API_KEY`, `GOOGLE_DIRECTIONS_ENDPOINT`
    /// - `TMAP_APP_KEY`, `TMAP_ENDPOINT`
    /// - `PROVIDER_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let timeout = std::env::var("PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(Duration::from_secs_f64)
            .unwrap_or(defaults.provider_timeout);

        Self {
            provider_timeout: timeout,
            primary: ProviderCredentials::new(
                std::env::var("GOOGLE_MAPS_API_KEY").ok(),
                std::env::var("GOOGLE_DIRECTIONS_ENDPOINT")
                    .unwrap_or(defaults.primary.endpoint),
            ),
            secondary: ProviderCredentials::new(
                std::env::var("TMAP_APP_KEY").ok(),
                std::env::var("TMAP_ENDPOINT").unwrap_or(defaults.secondary.endpoint),
            ),
        }
    }
}

/// Where a running simulation takes its position from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSource {
    /// Interpolated along the course path; progress follows elapsed time.
    #[default]
    Virtual,
    /// Per-tick GPS samples from an external collaborator; progress follows
    /// distance actually covered.
    Live,
}

/// Configuration for the tick controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Tick cadence.
    #[serde(with = "duration_millis")]
    pub tick_interval: Duration,
    /// Delay between completion and the auto-stop event.
    #[serde(with = "duration_millis")]
    pub completion_grace: Duration,
    /// Body weight used for calorie estimates.
    pub body_weight_kg: f64,
    pub position_source: PositionSource,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            completion_grace: Duration::from_secs(3),
            body_weight_kg: DEFAULT_BODY_WEIGHT_KG,
            position_source: PositionSource::Virtual,
        }
    }
}

impl SimulationConfig {
    pub fn live() -> Self {
        Self {
            position_source: PositionSource::Live,
            ..Default::default()
        }
    }

    pub fn with_body_weight(mut self, kg: f64) -> Self {
        self.body_weight_kg = kg;
        self
    }

    /// Elapsed time is counted in whole milliseconds, so the cadence must be
    /// at least [`MIN_TICK_INTERVAL`].
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.tick_interval < MIN_TICK_INTERVAL {
            return Err(SimulationError::InvalidTickInterval(self.tick_interval));
        }
        Ok(())
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
