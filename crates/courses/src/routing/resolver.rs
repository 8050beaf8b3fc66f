use std::time::Duration;

use super::providers::{GoogleDirections, TmapPedestrian};
use super::{ProviderRoute, RouteProvider, RouteRequest, synthesize_straight_line};
use crate::config::ResolverConfig;
use crate::errors::ProviderError;
use crate::geo_math::{bounds_of, path_length};
use crate::models::{Bounds, RouteResult};
use crate::profiles::exercise_duration_minutes;

/// Resolves routes through an ordered provider chain.
///
/// Providers are awaited one at a time in insertion order. A provider that
/// reports [`ProviderError::NoRoute`] hands over to the next one; any other
/// failure (including a timeout) ends the chain and the route is synthesised
/// as a straight line.
pub struct RouteResolver {
    providers: Vec<(String, Box<dyn RouteProvider>)>,
    timeout: Duration,
}

impl RouteResolver {
    /// An empty chain; every request resolves to the straight-line fallback.
    pub fn new(timeout: Duration) -> Self {
        Self {
            providers: Vec::new(),
            timeout,
        }
    }

    /// The standard chain: global directions as `primary`, pedestrian routing
    /// as `secondary`.
    pub fn from_config(config: &ResolverConfig) -> Self {
        let client = reqwest::Client::new();
        Self::new(config.provider_timeout)
            .with_provider(
                "primary",
                GoogleDirections::new(client.clone(), config.primary.clone()),
            )
            .with_provider(
                "secondary",
                TmapPedestrian::new(client, config.secondary.clone()),
            )
    }

    /// Appends a provider; its `label` becomes `provider_used` on success.
    pub fn with_provider(
        mut self,
        label: impl Into<String>,
        provider: impl RouteProvider + 'static,
    ) -> Self {
        self.providers.push((label.into(), Box::new(provider)));
        self
    }

    pub fn provider_labels(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|(label, _)| label.as_str())
    }

    /// Resolves `request` into a normalised route. Never fails.
    pub async fn resolve(&self, request: &RouteRequest) -> RouteResult {
        for (label, provider) in &self.providers {
            let outcome = tokio::time::timeout(self.timeout, provider.directions(request))
                .await
                .unwrap_or(Err(ProviderError::Timeout(self.timeout)))
                .and_then(check_path);

            match outcome {
                Ok(route) if route.path.len() >= 2 => {
                    tracing::info!(
                        provider = provider.name(),
                        label = label.as_str(),
                        points = route.path.len(),
                        "Route resolved"
                    );
                    return normalize(route, label, request);
                }
                Ok(_) => {
                    tracing::debug!(provider = provider.name(), "Provider returned an empty route");
                }
                Err(e) if e.is_recoverable() => {
                    tracing::debug!(provider = provider.name(), "No route, trying next provider");
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed; skipping remaining providers"
                    );
                    break;
                }
            }
        }

        tracing::warn!(
            start = ?request.start,
            end = ?request.end,
            "Falling back to a straight-line route"
        );
        synthesize_straight_line(request)
    }
}

/// Rejects routes carrying coordinates outside the valid lat/lng range.
fn check_path(route: ProviderRoute) -> Result<ProviderRoute, ProviderError> {
    match route.path.iter().position(|p| !p.is_valid()) {
        Some(index) => Err(ProviderError::Decode(format!(
            "route point {index} is not a valid coordinate"
        ))),
        None => Ok(route),
    }
}

/// Applies the normalisation contract: exercise time always comes from the
/// activity's reference speed, never from the provider's travel time.
fn normalize(route: ProviderRoute, label: &str, request: &RouteRequest) -> RouteResult {
    let distance = route
        .distance_meters
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or_else(|| path_length(&route.path));
    let bounds = route.bounds.or_else(|| bounds_of(&route.path));
    let minutes = exercise_duration_minutes(request.activity.profile(), distance);

    RouteResult {
        distance_meters: distance,
        duration_seconds: route.duration_seconds,
        exercise_duration_minutes: minutes,
        instructions: route.instructions,
        bounds: bounds.unwrap_or(Bounds {
            north: request.start.lat,
            south: request.start.lat,
            east: request.start.lng,
            west: request.start.lng,
        }),
        path: route.path,
        provider_used: label.to_string(),
    }
}
