//! Tmap pedestrian routing client (the Korea-specialised secondary provider).
//!
//! Responses are GeoJSON feature collections: `LineString` features carry the
//! path pieces, `Point` features carry turn descriptions, and the first feature's
//! properties hold the route totals.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{status_error, strip_tags};
use crate::config::ProviderCredentials;
use crate::errors::ProviderError;
use crate::models::{Instruction, LatLng};
use crate::routing::fallback::distance_label;
use crate::routing::{ProviderRoute, RouteProvider, RouteRequest};

/// The service accepts at most five pass-through points.
const MAX_PASS_POINTS: usize = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PedestrianRequest {
    start_x: f64,
    start_y: f64,
    end_x: f64,
    end_y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pass_list: Option<String>,
    start_name: &'static str,
    end_name: &'static str,
    req_coord_type: &'static str,
    res_coord_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
    #[serde(default)]
    properties: Properties,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Point { coordinates: [f64; 2] },
    LineString { coordinates: Vec<[f64; 2]> },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Properties {
    total_distance: Option<f64>,
    total_time: Option<f64>,
    description: Option<String>,
    distance: Option<f64>,
}

/// Client for the pedestrian route endpoint.
pub struct TmapPedestrian {
    client: reqwest::Client,
    credentials: ProviderCredentials,
}

impl TmapPedestrian {
    pub fn new(client: reqwest::Client, credentials: ProviderCredentials) -> Self {
        Self {
            client,
            credentials,
        }
    }
}

fn build_request(request: &RouteRequest) -> PedestrianRequest {
    let pass_list = (!request.waypoints.is_empty()).then(|| {
        request
            .waypoints
            .iter()
            .take(MAX_PASS_POINTS)
            .map(|p| format!("{},{}", p.lng, p.lat))
            .collect::<Vec<_>>()
            .join("_")
    });
    PedestrianRequest {
        start_x: request.start.lng,
        start_y: request.start.lat,
        end_x: request.end.lng,
        end_y: request.end.lat,
        pass_list,
        start_name: "start",
        end_name: "end",
        req_coord_type: "WGS84GEO",
        res_coord_type: "WGS84GEO",
    }
}

#[async_trait]
impl RouteProvider for TmapPedestrian {
    fn name(&self) -> &str {
        "tmap-pedestrian"
    }

    async fn directions(&self, request: &RouteRequest) -> Result<ProviderRoute, ProviderError> {
        let key = self
            .credentials
            .api_key
            .as_deref()
            .ok_or(ProviderError::InvalidCredentials)?;

        tracing::debug!(endpoint = %self.credentials.endpoint, "Requesting pedestrian route");

        let response = self
            .client
            .post(&self.credentials.endpoint)
            .header("appKey", key)
            .json(&build_request(request))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }

        let text = response.text().await?;
        let parsed: FeatureCollection = serde_json::from_str(&text)?;
        parse_response(parsed)
    }
}

fn parse_response(collection: FeatureCollection) -> Result<ProviderRoute, ProviderError> {
    let mut path: Vec<LatLng> = Vec::new();
    let mut turns: Vec<(LatLng, String, Option<f64>)> = Vec::new();
    let mut total_distance = None;
    let mut total_time = None;

    for feature in collection.features {
        total_distance = total_distance.or(feature.properties.total_distance);
        total_time = total_time.or(feature.properties.total_time);
        match feature.geometry {
            Geometry::LineString { coordinates } => {
                for [lng, lat] in coordinates {
                    let point = LatLng::new(lat, lng);
                    // consecutive pieces share their joint
                    if path.last() != Some(&point) {
                        path.push(point);
                    }
                }
            }
            Geometry::Point { coordinates: [lng, lat] } => {
                if let Some(description) = feature.properties.description {
                    turns.push((
                        LatLng::new(lat, lng),
                        strip_tags(&description),
                        feature.properties.distance,
                    ));
                }
            }
        }
    }

    if path.len() < 2 {
        return Err(ProviderError::NoRoute);
    }

    let instructions = turns
        .iter()
        .enumerate()
        .map(|(i, (at, text, distance))| Instruction {
            text: text.clone(),
            distance_label: distance_label(distance.unwrap_or(0.0)),
            start_location: *at,
            end_location: turns.get(i + 1).map(|(next, _, _)| *next).unwrap_or(*at),
        })
        .collect();

    Ok(ProviderRoute {
        path,
        distance_meters: total_distance,
        duration_seconds: total_time.unwrap_or(0.0),
        instructions,
        bounds: None,
    })
}
