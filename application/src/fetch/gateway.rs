use std::sync::Arc;
use tracing::{debug, instrument, warn};

use domain::cache_key::{BoundaryScope, CacheKey};
use domain::coords::GeoPoint;
use domain::dataset::{DatasetKind, FeatureCollection, StreetGraph};
use domain::fetch_spec::FetchSpec;
use domain::geometry::Boundary;
use domain::job::StatusUpdate;
use domain::tags::TagFilter;

use crate::config::FetchSettings;
use crate::error::{AppError, AppResult};
use crate::ports::outgoing::{
    dataset_cache::{CacheEntry, DynDatasetCachePort},
    geo_provider::{DynGeoProviderPort, ProviderError},
    progress::ProgressSink,
    sleeper::DynSleeperPort,
};

/// Cache-first access to the geodata provider.
///
/// Every lookup consults the cache, falls back to the provider, waits the
/// configured politeness delay after a successful provider call and then
/// persists the result. Cache failures never abort a lookup: read errors count
/// as a miss and write errors are logged.
#[derive(Clone)]
pub struct GeoDataGateway {
    cache: DynDatasetCachePort,
    provider: DynGeoProviderPort,
    sleeper: DynSleeperPort,
    settings: Arc<FetchSettings>,
}

impl GeoDataGateway {
    pub fn new(
        cache: DynDatasetCachePort,
        provider: DynGeoProviderPort,
        sleeper: DynSleeperPort,
        settings: Arc<FetchSettings>,
    ) -> Self {
        Self {
            cache,
            provider,
            sleeper,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    fn cached(&self, key: &CacheKey) -> Option<CacheEntry> {
        match self.cache.get(key) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = key.canonical(), error = %e, "Cache read failed, fetching fresh data");
                None
            }
        }
    }

    fn persist(&self, key: &CacheKey, entry: &CacheEntry) {
        if let Err(e) = self.cache.set(key, entry) {
            warn!(key = key.canonical(), error = %e, "Cache write failed");
        }
    }

    /// Street network for `spec`. `Ok(None)` when the provider has no roads there.
    #[instrument(skip(self, progress), fields(area = %spec))]
    pub async fn fetch_streets(
        &self,
        spec: &FetchSpec,
        progress: &dyn ProgressSink,
    ) -> Result<Option<Arc<StreetGraph>>, ProviderError> {
        let network = self.settings.network_type;
        let key = CacheKey::streets(spec, network);

        if let Some(CacheEntry::Streets(graph)) = self.cached(&key) {
            debug!("Using cached street network");
            progress.report(StatusUpdate::cache_hit(DatasetKind::Streets, true));
            return Ok(Some(graph));
        }
        progress.report(StatusUpdate::cache_hit(DatasetKind::Streets, false));

        let graph = self.provider.street_graph(spec, network).await?;
        if graph.is_empty() {
            warn!("Provider returned an empty street network");
            return Ok(None);
        }
        self.sleeper.sleep(self.settings.streets_delay).await;

        let graph = Arc::new(graph);
        self.persist(&key, &CacheEntry::Streets(Arc::clone(&graph)));
        debug!(edges = graph.edges.len(), "Fetched street network");
        Ok(Some(graph))
    }

    /// Features of one dataset. Empty results are returned as `Ok(None)` and
    /// are not cached.
    #[instrument(skip(self, filter, progress), fields(area = %spec))]
    pub async fn fetch_features(
        &self,
        kind: DatasetKind,
        spec: &FetchSpec,
        filter: &TagFilter,
        progress: &dyn ProgressSink,
    ) -> Result<Option<Arc<FeatureCollection>>, ProviderError> {
        let key = CacheKey::features(kind, spec, filter);

        if let Some(CacheEntry::Features(features)) = self.cached(&key) {
            debug!("Using cached {} features", kind);
            progress.report(StatusUpdate::cache_hit(kind, true));
            return Ok(Some(features));
        }
        progress.report(StatusUpdate::cache_hit(kind, false));

        let features = self.provider.features(spec, filter).await?;
        if features.is_empty() {
            debug!("No {} features in area", kind);
            return Ok(None);
        }
        self.sleeper.sleep(self.settings.features_delay).await;

        let features = Arc::new(features);
        self.persist(&key, &CacheEntry::Features(Arc::clone(&features)));
        debug!(count = features.features.len(), "Fetched {} features", kind);
        Ok(Some(features))
    }

    /// Geocodes `city, country`, sleeping before the provider call.
    #[instrument(skip(self))]
    pub async fn lookup_coordinates(&self, city: &str, country: &str) -> AppResult<GeoPoint> {
        let key = CacheKey::coordinates(city, country);
        if let Some(CacheEntry::Coordinates(point)) = self.cached(&key) {
            debug!("Using cached coordinates");
            return Ok(point);
        }

        self.sleeper.sleep(self.settings.geocode_delay).await;
        let point = self
            .provider
            .geocode(city, country)
            .await?
            .ok_or_else(|| AppError::NotFound {
                message: format!("Could not find coordinates for {city}, {country}"),
            })?;

        self.persist(&key, &CacheEntry::Coordinates(point));
        debug!(lat = point.lat, lon = point.lon, "Geocoded location");
        Ok(point)
    }

    #[instrument(skip(self))]
    pub async fn lookup_boundary(
        &self,
        scope: BoundaryScope,
        name: &str,
    ) -> AppResult<Arc<Boundary>> {
        let key = CacheKey::boundary(scope, name);
        if let Some(CacheEntry::Boundary(boundary)) = self.cached(&key) {
            debug!("Using cached boundary");
            return Ok(boundary);
        }

        let boundary = self
            .provider
            .boundary_for(name)
            .await?
            .ok_or_else(|| AppError::NotFound {
                message: format!("Could not find boundary for '{name}'"),
            })?;
        self.sleeper.sleep(self.settings.boundary_delay).await;

        let boundary = Arc::new(boundary);
        self.persist(&key, &CacheEntry::Boundary(Arc::clone(&boundary)));
        debug!(polygons = boundary.polygons.len(), "Fetched boundary");
        Ok(boundary)
    }
}
