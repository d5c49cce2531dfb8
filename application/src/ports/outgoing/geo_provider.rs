use std::sync::Arc;
use thiserror::Error;

use domain::coords::GeoPoint;
use domain::dataset::{FeatureCollection, StreetGraph};
use domain::fetch_spec::{FetchSpec, NetworkType};
use domain::geometry::Boundary;
use domain::tags::TagFilter;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("request timed out: {message}")]
    Timeout { message: String },

    #[error("rate limited: {message}")]
    RateLimited { message: String },

    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("could not decode response: {message}")]
    Decode { message: String },
}

impl ProviderError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// External geodata source: geocoder, boundary lookup and OSM extracts.
/// Empty results are returned as `Ok` with empty collections or `None`.
#[async_trait::async_trait]
pub trait GeoProviderPort: Send + Sync {
    async fn geocode(&self, city: &str, country: &str) -> Result<Option<GeoPoint>, ProviderError>;

    async fn boundary_for(&self, name: &str) -> Result<Option<Boundary>, ProviderError>;

    async fn street_graph(
        &self,
        spec: &FetchSpec,
        network: NetworkType,
    ) -> Result<StreetGraph, ProviderError>;

    async fn features(
        &self,
        spec: &FetchSpec,
        filter: &TagFilter,
    ) -> Result<FeatureCollection, ProviderError>;
}

pub type DynGeoProviderPort = Arc<dyn GeoProviderPort>;
