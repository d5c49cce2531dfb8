use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Url};
use tracing::{debug, instrument};

use cityposter_application::ports::outgoing::geo_provider::ProviderError;
use domain::coords::GeoPoint;
use domain::geometry::Boundary;

use super::dto::NominatimPlaceDto;
use super::errors::{map_transport_error, success_body};

const BOUNDARY_CANDIDATES: &str = "5";

pub struct NominatimClient {
    client: Client,
    search_endpoint: Url,
    user_agent: String,
}

/// `base` with a trailing `search` segment, keeping any path prefix.
pub(super) fn search_endpoint(base: &Url) -> Result<Url, ProviderError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("search")
        .map_err(|e| ProviderError::invalid_request(format!("invalid Nominatim URL: {e}")))
}

impl NominatimClient {
    pub fn new(client: Client, base: &Url, user_agent: String) -> Result<Self, ProviderError> {
        Ok(Self {
            client,
            search_endpoint: search_endpoint(base)?,
            user_agent,
        })
    }

    async fn search(
        &self,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<NominatimPlaceDto>, ProviderError> {
        let response = self
            .client
            .get(self.search_endpoint.clone())
            .header(USER_AGENT, self.user_agent.as_str())
            .header(ACCEPT, "application/json")
            .query(&[("q", query), ("format", "json")])
            .query(params)
            .send()
            .await
            .map_err(|e| map_transport_error(&e))?;
        let body = success_body(response).await?;

        serde_json::from_slice(&body).map_err(|e| {
            ProviderError::decode(format!("invalid Nominatim JSON payload: {e}"))
        })
    }

    #[instrument(skip(self))]
    pub async fn geocode(&self, city: &str, country: &str) -> Result<Option<GeoPoint>, ProviderError> {
        let places = self
            .search(&format!("{city}, {country}"), &[("limit", "1")])
            .await?;
        let Some(place) = places.first() else {
            return Ok(None);
        };
        debug!(display_name = %place.display_name, "Geocoded place");
        place.point().map(Some).map_err(ProviderError::decode)
    }

    /// First candidate with an areal outline wins.
    #[instrument(skip(self))]
    pub async fn boundary(&self, name: &str) -> Result<Option<Boundary>, ProviderError> {
        let places = self
            .search(
                name,
                &[("limit", BOUNDARY_CANDIDATES), ("polygon_geojson", "1")],
            )
            .await?;

        for place in &places {
            if let Some(boundary) = place.boundary(name).map_err(ProviderError::decode)? {
                debug!(
                    display_name = %place.display_name,
                    polygons = boundary.polygons.len(),
                    "Boundary resolved"
                );
                return Ok(Some(boundary));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://nominatim.openstreetmap.org", "https://nominatim.openstreetmap.org/search")]
    #[case("https://nominatim.openstreetmap.org/", "https://nominatim.openstreetmap.org/search")]
    #[case("http://localhost:8080/nominatim", "http://localhost:8080/nominatim/search")]
    fn search_endpoint_keeps_path_prefix(#[case] base: &str, #[case] expected: &str) {
        let base = Url::parse(base).expect("valid url");
        assert_eq!(search_endpoint(&base).expect("joined").as_str(), expected);
    }
}
