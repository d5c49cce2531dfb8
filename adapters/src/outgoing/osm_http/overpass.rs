//! Overpass QL query building and the POST client.

use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Url};
use tracing::{debug, instrument};

use cityposter_application::ports::outgoing::geo_provider::ProviderError;
use domain::coords::BoundingBox;
use domain::dataset::{FeatureCollection, StreetGraph};
use domain::fetch_spec::{FetchSpec, NetworkType};
use domain::tags::TagFilter;

use super::dto::OverpassResponseDto;
use super::errors::{map_transport_error, success_body};

pub struct OverpassClient {
    client: Client,
    endpoint: Url,
    user_agent: String,
    query_timeout_secs: u64,
}

impl OverpassClient {
    pub fn new(client: Client, endpoint: Url, user_agent: String, query_timeout_secs: u64) -> Self {
        Self {
            client,
            endpoint,
            user_agent,
            query_timeout_secs: query_timeout_secs.max(1),
        }
    }

    #[instrument(skip(self, spec), fields(area = %spec))]
    pub async fn street_graph(
        &self,
        spec: &FetchSpec,
        network: NetworkType,
    ) -> Result<StreetGraph, ProviderError> {
        let query = build_streets_query(spec, network, self.query_timeout_secs)?;
        let graph = self.run(query).await?.into_street_graph();
        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "Street network decoded"
        );
        Ok(graph)
    }

    #[instrument(skip(self, spec, filter), fields(area = %spec, tags = %filter.canonical()))]
    pub async fn features(
        &self,
        spec: &FetchSpec,
        filter: &TagFilter,
    ) -> Result<FeatureCollection, ProviderError> {
        let query = build_features_query(spec, filter, self.query_timeout_secs)?;
        let features = self.run(query).await?.into_features(filter);
        debug!(features = features.features.len(), "Features decoded");
        Ok(features)
    }

    async fn run(&self, query: String) -> Result<OverpassResponseDto, ProviderError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(USER_AGENT, self.user_agent.as_str())
            .header(ACCEPT, "application/json")
            .form(&[("data", query)])
            .send()
            .await
            .map_err(|e| map_transport_error(&e))?;
        let body = success_body(response).await?;

        serde_json::from_slice(&body).map_err(|e| {
            ProviderError::decode(format!("invalid Overpass JSON payload: {e}"))
        })
    }
}

/// Way filter per network profile, in the style of the common OSM routing presets.
fn network_filter(network: NetworkType) -> &'static str {
    match network {
        NetworkType::Drive => concat!(
            r#"["highway"]["area"!~"yes"]"#,
            r#"["highway"!~"abandoned|bridleway|bus_guideway|construction|corridor|cycleway|elevator|escalator|footway|no|path|pedestrian|planned|platform|proposed|raceway|razed|service|steps|track"]"#,
            r#"["motor_vehicle"!~"no"]["motorcar"!~"no"]"#,
            r#"["service"!~"alley|driveway|emergency_access|parking|parking_aisle|private"]"#,
        ),
        NetworkType::DriveService => concat!(
            r#"["highway"]["area"!~"yes"]"#,
            r#"["highway"!~"abandoned|bridleway|bus_guideway|construction|corridor|cycleway|elevator|escalator|footway|no|path|pedestrian|planned|platform|proposed|raceway|razed|steps|track"]"#,
            r#"["motor_vehicle"!~"no"]["motorcar"!~"no"]"#,
            r#"["service"!~"emergency_access|parking|parking_aisle|private"]"#,
        ),
        NetworkType::Walk => concat!(
            r#"["highway"]["area"!~"yes"]"#,
            r#"["highway"!~"abandoned|bus_guideway|construction|cycleway|motor|no|planned|platform|proposed|raceway|razed"]"#,
            r#"["foot"!~"no"]["service"!~"private"]"#,
        ),
        NetworkType::Bike => concat!(
            r#"["highway"]["area"!~"yes"]"#,
            r#"["highway"!~"abandoned|bus_guideway|construction|corridor|elevator|escalator|footway|motor|no|planned|platform|proposed|raceway|razed|steps"]"#,
            r#"["bicycle"!~"no"]["service"!~"private"]"#,
        ),
        NetworkType::All => concat!(
            r#"["highway"]["area"!~"yes"]"#,
            r#"["highway"!~"abandoned|construction|no|planned|platform|proposed|raceway|razed"]"#,
            r#"["service"!~"private"]"#,
        ),
    }
}

fn validate_bbox(bbox: &BoundingBox) -> Result<(), ProviderError> {
    let values = [bbox.south, bbox.west, bbox.north, bbox.east];
    if values.iter().any(|value| !value.is_finite()) {
        return Err(ProviderError::invalid_request(
            "bounding box must contain finite coordinates",
        ));
    }
    if bbox.south >= bbox.north || bbox.west >= bbox.east {
        return Err(ProviderError::invalid_request(
            "bounding box must be south < north and west < east",
        ));
    }
    Ok(())
}

/// One area clause per polygon for boundaries, a `south,west,north,east` box otherwise.
fn area_clauses(spec: &FetchSpec) -> Result<Vec<String>, ProviderError> {
    match spec {
        FetchSpec::Radius { .. } => {
            let bbox = spec
                .bbox()
                .ok_or_else(|| ProviderError::invalid_request("fetch area has no extent"))?;
            validate_bbox(&bbox)?;
            Ok(vec![format!(
                "({},{},{},{})",
                bbox.south, bbox.west, bbox.north, bbox.east
            )])
        }
        FetchSpec::Boundary(boundary) => {
            let clauses: Vec<String> = boundary
                .polygons
                .iter()
                .map(|polygon| {
                    let points = polygon
                        .exterior
                        .iter()
                        .map(|point| format!("{:.6} {:.6}", point.lat, point.lon))
                        .collect::<Vec<_>>()
                        .join(" ");
                    format!("(poly:\"{points}\")")
                })
                .collect();
            if clauses.is_empty() {
                return Err(ProviderError::invalid_request(format!(
                    "boundary '{}' has no polygons",
                    boundary.name
                )));
            }
            Ok(clauses)
        }
    }
}

fn wrap_query(statements: &[String], timeout_secs: u64) -> String {
    format!(
        "[out:json][timeout:{timeout_secs}];\n(\n{}\n);\nout body;\n>;\nout skel qt;",
        statements.join("\n")
    )
}

fn build_streets_query(
    spec: &FetchSpec,
    network: NetworkType,
    timeout_secs: u64,
) -> Result<String, ProviderError> {
    let filter = network_filter(network);
    let statements: Vec<String> = area_clauses(spec)?
        .iter()
        .map(|area| format!("  way{filter}{area};"))
        .collect();
    Ok(wrap_query(&statements, timeout_secs))
}

fn build_features_query(
    spec: &FetchSpec,
    filter: &TagFilter,
    timeout_secs: u64,
) -> Result<String, ProviderError> {
    if filter.is_empty() {
        return Err(ProviderError::invalid_request(
            "tag filter must name at least one tag",
        ));
    }
    let areas = area_clauses(spec)?;
    let mut statements = Vec::new();
    for (key, value) in filter.pairs() {
        let selector = format!("[\"{}\"=\"{}\"]", escape_quoted(key), escape_quoted(value));
        for area in &areas {
            statements.push(format!("  nwr{selector}{area};"));
        }
    }
    Ok(wrap_query(&statements, timeout_secs))
}

fn escape_quoted(raw: &str) -> String {
    raw.replace('\\', r"\\").replace('"', "\\\"")
}
