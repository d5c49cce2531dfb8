//! OpenStreetMap-backed geodata provider: Nominatim for geocoding and
//! boundaries, Overpass for street networks and tagged features.

mod dto;
mod errors;
pub mod nominatim;
pub mod overpass;

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;

use cityposter_application::error::{AppError, AppResult};
use cityposter_application::infrastructure_config::ProviderConfig;
use cityposter_application::ports::outgoing::geo_provider::{GeoProviderPort, ProviderError};
use domain::coords::GeoPoint;
use domain::dataset::{FeatureCollection, StreetGraph};
use domain::fetch_spec::{FetchSpec, NetworkType};
use domain::geometry::Boundary;
use domain::tags::TagFilter;

use nominatim::NominatimClient;
use overpass::OverpassClient;

#[derive(Debug, Clone)]
pub struct OsmHttpSettings {
    pub nominatim_url: Url,
    pub overpass_url: Url,
    pub user_agent: String,
    pub request_timeout: Duration,
}

impl OsmHttpSettings {
    pub fn from_config(config: &ProviderConfig) -> AppResult<Self> {
        let parse = |name: &str, value: &str| {
            Url::parse(value).map_err(|e| AppError::ConfigError {
                message: format!("{name} is not a valid URL: {e}"),
            })
        };
        Ok(Self {
            nominatim_url: parse("nominatim_url", &config.nominatim_url)?,
            overpass_url: parse("overpass_url", &config.overpass_url)?,
            user_agent: config.user_agent.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }
}

pub struct OsmHttpProvider {
    nominatim: NominatimClient,
    overpass: OverpassClient,
}

impl OsmHttpProvider {
    /// Builds one shared reqwest client with the configured request timeout.
    pub fn new(settings: OsmHttpSettings) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| AppError::ConfigError {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        let nominatim = NominatimClient::new(
            client.clone(),
            &settings.nominatim_url,
            settings.user_agent.clone(),
        )
        .map_err(|e| AppError::ConfigError {
            message: e.to_string(),
        })?;
        let overpass = OverpassClient::new(
            client,
            settings.overpass_url,
            settings.user_agent,
            settings.request_timeout.as_secs(),
        );

        Ok(Self {
            nominatim,
            overpass,
        })
    }
}

#[async_trait]
impl GeoProviderPort for OsmHttpProvider {
    async fn geocode(&self, city: &str, country: &str) -> Result<Option<GeoPoint>, ProviderError> {
        self.nominatim.geocode(city, country).await
    }

    async fn boundary_for(&self, name: &str) -> Result<Option<Boundary>, ProviderError> {
        self.nominatim.boundary(name).await
    }

    async fn street_graph(
        &self,
        spec: &FetchSpec,
        network: NetworkType,
    ) -> Result<StreetGraph, ProviderError> {
        self.overpass.street_graph(spec, network).await
    }

    async fn features(
        &self,
        spec: &FetchSpec,
        filter: &TagFilter,
    ) -> Result<FeatureCollection, ProviderError> {
        self.overpass.features(spec, filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityposter_application::infrastructure_config::Config;

    #[test]
    fn settings_follow_provider_config() {
        let config = Config::default();

        let settings = OsmHttpSettings::from_config(&config.provider).expect("valid defaults");

        assert_eq!(settings.request_timeout, Duration::from_secs(180));
        assert_eq!(settings.overpass_url.host_str(), Some("overpass-api.de"));
        assert!(OsmHttpProvider::new(settings).is_ok());
    }

    #[test]
    fn malformed_url_is_a_config_error() {
        let mut config = Config::default();
        config.provider.overpass_url = "not a url".to_string();

        let err = OsmHttpSettings::from_config(&config.provider).expect_err("invalid url");

        assert!(matches!(err, AppError::ConfigError { .. }));
    }
}
