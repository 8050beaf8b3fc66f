use async_trait::async_trait;

use super::RouteRequest;
use crate::errors::ProviderError;
use crate::models::{Bounds, Instruction, LatLng};

/// A route as returned by one provider, before normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRoute {
    pub path: Vec<LatLng>,
    /// Provider-reported length; `None` lets the resolver measure the path.
    pub distance_meters: Option<f64>,
    /// Provider travel time, kept for reference only.
    pub duration_seconds: f64,
    pub instructions: Vec<Instruction>,
    pub bounds: Option<Bounds>,
}

/// An external directions service.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Requests a route for `request`.
    ///
    /// Implementations report "no route between these points" as
    /// [`ProviderError::NoRoute`] and every other failure with the matching
    /// non-recoverable variant.
    async fn directions(&self, request: &RouteRequest) -> Result<ProviderRoute, ProviderError>;
}
