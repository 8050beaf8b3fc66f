//! Google Directions API client (the global primary provider).

use async_trait::async_trait;
use serde::Deserialize;

use super::{status_error, strip_tags};
use crate::config::ProviderCredentials;
use crate::errors::ProviderError;
use crate::models::{Bounds, Instruction, LatLng};
use crate::routing::{ProviderRoute, RouteProvider, RouteRequest, polyline};

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    overview_polyline: EncodedPolyline,
    #[serde(default)]
    legs: Vec<Leg>,
    #[serde(default)]
    bounds: Option<DirectionsBounds>,
}

#[derive(Debug, Deserialize)]
struct EncodedPolyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct Leg {
    distance: TextValue,
    duration: TextValue,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    html_instructions: String,
    distance: TextValue,
    start_location: GoogleLatLng,
    end_location: GoogleLatLng,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    #[serde(default)]
    text: String,
    value: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct GoogleLatLng {
    lat: f64,
    lng: f64,
}

impl From<GoogleLatLng> for LatLng {
    fn from(p: GoogleLatLng) -> Self {
        LatLng::new(p.lat, p.lng)
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsBounds {
    northeast: GoogleLatLng,
    southwest: GoogleLatLng,
}

/// Client for the Directions JSON API.
pub struct GoogleDirections {
    client: reqwest::Client,
    credentials: ProviderCredentials,
}

impl GoogleDirections {
    pub fn new(client: reqwest::Client, credentials: ProviderCredentials) -> Self {
        Self {
            client,
            credentials,
        }
    }

    fn query(&self, request: &RouteRequest, key: &str) -> Vec<(&'static str, String)> {
        let profile = request.activity.profile();
        let mut query = vec![
            ("origin", format_point(request.start)),
            ("destination", format_point(request.end)),
            ("mode", profile.travel_mode().as_str().to_string()),
            ("key", key.to_string()),
        ];
        if !request.waypoints.is_empty() {
            let via = request
                .waypoints
                .iter()
                .map(|p| format!("via:{}", format_point(*p)))
                .collect::<Vec<_>>()
                .join("|");
            query.push(("waypoints", via));
        }
        if profile.avoid_highways_and_tolls() {
            query.push(("avoid", "highways|tolls".to_string()));
        }
        query
    }
}

fn format_point(p: LatLng) -> String {
    format!("{},{}", p.lat, p.lng)
}

#[async_trait]
impl RouteProvider for GoogleDirections {
    fn name(&self) -> &str {
        "google-directions"
    }

    async fn directions(&self, request: &RouteRequest) -> Result<ProviderRoute, ProviderError> {
        let key = self
            .credentials
            .api_key
            .as_deref()
            .ok_or(ProviderError::InvalidCredentials)?;

        tracing::debug!(
            endpoint = %self.credentials.endpoint,
            mode = request.activity.profile().travel_mode().as_str(),
            "Requesting directions"
        );

        let response = self
            .client
            .get(&self.credentials.endpoint)
            .query(&self.query(request, key))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }

        let text = response.text().await?;
        let parsed: DirectionsResponse = serde_json::from_str(&text)?;
        parse_response(parsed)
    }
}

fn parse_response(response: DirectionsResponse) -> Result<ProviderRoute, ProviderError> {
    match response.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" | "NOT_FOUND" => return Err(ProviderError::NoRoute),
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => return Err(ProviderError::QuotaExceeded),
        "REQUEST_DENIED" => return Err(ProviderError::InvalidCredentials),
        other => {
            return Err(ProviderError::Unavailable(match response.error_message {
                Some(message) => format!("{other}: {message}"),
                None => other.to_string(),
            }));
        }
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or(ProviderError::NoRoute)?;
    let path = polyline::decode(&route.overview_polyline.points)?;

    let distance: f64 = route.legs.iter().map(|leg| leg.distance.value).sum();
    let duration: f64 = route.legs.iter().map(|leg| leg.duration.value).sum();
    let instructions = route
        .legs
        .into_iter()
        .flat_map(|leg| leg.steps)
        .map(|step| Instruction {
            text: strip_tags(&step.html_instructions),
            distance_label: step.distance.text,
            start_location: step.start_location.into(),
            end_location: step.end_location.into(),
        })
        .collect();
    let bounds = route.bounds.map(|b| Bounds {
        north: b.northeast.lat,
        south: b.southwest.lat,
        east: b.northeast.lng,
        west: b.southwest.lng,
    });

    Ok(ProviderRoute {
        path,
        distance_meters: (distance > 0.0).then_some(distance),
        duration_seconds: duration,
        instructions,
        bounds,
    })
}
