//! In-memory port implementations shared by the unit tests.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use domain::cache_key::CacheKey;
use domain::coords::GeoPoint;
use domain::dataset::{
    DatasetKind, Feature, FeatureCollection, FeatureGeometry, StreetEdge, StreetGraph,
};
use domain::fetch_spec::{FetchSpec, NetworkType};
use domain::geometry::{Boundary, Polygon};
use domain::job::{JobId, Phase, StatusUpdate};
use domain::poster::OutputFormat;
use domain::tags::TagFilter;
use domain::theme::ThemeSpec;

use crate::error::{AppError, AppResult};
use crate::ports::outgoing::{
    artifact_store::ArtifactStorePort,
    blocking_task::{BlockingRenderPort, RenderFuture},
    dataset_cache::{CacheEntry, CacheError, DatasetCachePort},
    geo_provider::{GeoProviderPort, ProviderError},
    progress::{DynProgressSink, ProgressSink},
    renderer::RenderRequest,
    sleeper::SleeperPort,
    task_spawn::{JobFuture, TaskSpawnPort},
    theme_store::ThemeStorePort,
};

fn point(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint { lat, lon }
}

pub fn sample_graph() -> StreetGraph {
    StreetGraph {
        nodes: BTreeMap::from([
            (1, point(-6.20, 106.80)),
            (2, point(-6.21, 106.81)),
            (3, point(-6.22, 106.80)),
        ]),
        edges: vec![
            StreetEdge {
                from: 1,
                to: 2,
                highway: Some("primary".to_string()),
            },
            StreetEdge {
                from: 2,
                to: 3,
                highway: Some("residential".to_string()),
            },
        ],
    }
}

fn square(lat: f64, lon: f64, size: f64) -> Polygon {
    Polygon {
        exterior: vec![
            point(lat, lon),
            point(lat, lon + size),
            point(lat + size, lon + size),
            point(lat + size, lon),
        ],
        holes: Vec::new(),
    }
}

pub fn sample_features() -> FeatureCollection {
    FeatureCollection {
        features: vec![Feature {
            id: 10,
            tags: BTreeMap::from([("natural".to_string(), "water".to_string())]),
            geometry: FeatureGeometry::Polygon(square(-6.21, 106.80, 0.005)),
        }],
    }
}

pub fn sample_boundary() -> Boundary {
    Boundary {
        name: "Coblong".to_string(),
        polygons: vec![square(-6.90, 107.60, 0.02)],
    }
}

#[derive(Default)]
pub struct FakeCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    fail_writes: bool,
}

impl FakeCache {
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock").len()
    }
}

impl DatasetCachePort for FakeCache {
    fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.entries.lock().expect("cache lock").get(key.digest()).cloned())
    }

    fn set(&self, key: &CacheKey, entry: &CacheEntry) -> Result<(), CacheError> {
        if self.fail_writes {
            return Err(CacheError::Storage {
                key: key.canonical().to_string(),
                source: io::Error::other("disk full"),
            });
        }
        self.entries
            .lock()
            .expect("cache lock")
            .insert(key.digest().to_string(), entry.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeProvider {
    graph: StreetGraph,
    features: FeatureCollection,
    place: Option<GeoPoint>,
    boundary: Option<Boundary>,
    fail_streets: bool,
    fail_features: bool,
    delays: BTreeMap<DatasetKind, Duration>,
    finished: Arc<Mutex<Vec<String>>>,
    street_calls: AtomicUsize,
    feature_calls: AtomicUsize,
    geocode_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn with_graph(graph: StreetGraph) -> Self {
        Self {
            graph,
            ..Self::default()
        }
    }

    pub fn with_features(mut self, features: FeatureCollection) -> Self {
        self.features = features;
        self
    }

    pub fn with_place(mut self, place: GeoPoint) -> Self {
        self.place = Some(place);
        self
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = Some(boundary);
        self
    }

    pub fn failing_streets(mut self) -> Self {
        self.fail_streets = true;
        self
    }

    pub fn failing_features(mut self) -> Self {
        self.fail_features = true;
        self
    }

    /// Holds the provider call for `kind` open for `delay`.
    pub fn with_delay(mut self, kind: DatasetKind, delay: Duration) -> Self {
        self.delays.insert(kind, delay);
        self
    }

    /// Log receiving `"{dataset}_done"` as each dataset call returns.
    pub fn with_log(mut self, log: Arc<Mutex<Vec<String>>>) -> Self {
        self.finished = log;
        self
    }

    async fn answer(&self, kind: DatasetKind) {
        if let Some(delay) = self.delays.get(&kind) {
            tokio::time::sleep(*delay).await;
        }
        self.finished.lock().expect("log lock").push(format!("{kind}_done"));
    }

    pub fn street_calls(&self) -> usize {
        self.street_calls.load(Ordering::SeqCst)
    }

    pub fn feature_calls(&self) -> usize {
        self.feature_calls.load(Ordering::SeqCst)
    }

    pub fn geocode_calls(&self) -> usize {
        self.geocode_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl GeoProviderPort for FakeProvider {
    async fn geocode(&self, _city: &str, _country: &str) -> Result<Option<GeoPoint>, ProviderError> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.place)
    }

    async fn boundary_for(&self, _name: &str) -> Result<Option<Boundary>, ProviderError> {
        Ok(self.boundary.clone())
    }

    async fn street_graph(
        &self,
        _spec: &FetchSpec,
        _network: NetworkType,
    ) -> Result<StreetGraph, ProviderError> {
        self.street_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(DatasetKind::Streets).await;
        if self.fail_streets {
            return Err(ProviderError::timeout("overpass did not answer"));
        }
        Ok(self.graph.clone())
    }

    async fn features(
        &self,
        _spec: &FetchSpec,
        filter: &TagFilter,
    ) -> Result<FeatureCollection, ProviderError> {
        self.feature_calls.fetch_add(1, Ordering::SeqCst);
        let kind = if *filter == TagFilter::water() {
            DatasetKind::Water
        } else {
            DatasetKind::Parks
        };
        self.answer(kind).await;
        if self.fail_features {
            return Err(ProviderError::rate_limited("slow down"));
        }
        Ok(self.features.clone())
    }
}

#[derive(Default)]
pub struct InstantSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl InstantSleeper {
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().expect("sleeper lock").clone()
    }
}

#[async_trait::async_trait]
impl SleeperPort for InstantSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().expect("sleeper lock").push(duration);
    }
}

#[derive(Default)]
pub struct RecordingSink {
    updates: Mutex<Vec<StatusUpdate>>,
    cancelled: AtomicBool,
}

impl RecordingSink {
    pub fn cancelled() -> Self {
        let sink = Self::default();
        sink.cancelled.store(true, Ordering::SeqCst);
        sink
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.updates.lock().expect("sink lock").clone()
    }

    pub fn last(&self) -> Option<StatusUpdate> {
        self.updates().pop()
    }

    pub fn cache_reports(&self, kind: DatasetKind) -> Vec<bool> {
        self.updates()
            .iter()
            .filter_map(|update| update.cache_hits.get(&kind).copied())
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn report(&self, update: StatusUpdate) {
        self.updates.lock().expect("sink lock").push(update);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct FakeThemeStore {
    themes: BTreeMap<String, ThemeSpec>,
}

impl FakeThemeStore {
    pub fn with_themes(ids: &[&str]) -> Self {
        let themes = ids
            .iter()
            .map(|id| {
                let mut theme = ThemeSpec::feature_based();
                theme.name = (*id).to_string();
                ((*id).to_string(), theme)
            })
            .collect();
        Self { themes }
    }
}

impl ThemeStorePort for FakeThemeStore {
    fn list(&self) -> AppResult<Vec<String>> {
        Ok(self.themes.keys().cloned().collect())
    }

    fn load(&self, theme_id: &str) -> AppResult<Option<ThemeSpec>> {
        Ok(self.themes.get(theme_id).cloned())
    }
}

/// Records render requests and walks through the render phases without drawing.
#[derive(Default)]
pub struct FakeRenderer {
    fail_on: Option<String>,
    requests: Mutex<Vec<RenderRequest>>,
}

impl FakeRenderer {
    pub fn failing_on(theme_id: &str) -> Self {
        Self {
            fail_on: Some(theme_id.to_string()),
            ..Self::default()
        }
    }

    pub fn rendered_themes(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("renderer lock")
            .iter()
            .map(|request| request.theme_id.clone())
            .collect()
    }

    pub fn last_request(&self) -> Option<RenderRequest> {
        self.requests.lock().expect("renderer lock").last().cloned()
    }

    fn render(&self, request: RenderRequest, progress: &dyn ProgressSink) -> AppResult<()> {
        for phase in [Phase::RenderSetup, Phase::RenderRoads, Phase::RenderSave] {
            if progress.is_cancelled() {
                return Err(AppError::Cancelled);
            }
            progress.report(StatusUpdate::phase(phase, "rendering"));
        }
        let failing = self.fail_on.as_deref() == Some(request.theme_id.as_str());
        self.requests.lock().expect("renderer lock").push(request);
        if failing {
            return Err(AppError::RenderError {
                message: "canvas exploded".to_string(),
            });
        }
        Ok(())
    }
}

impl BlockingRenderPort for FakeRenderer {
    fn render_blocking(&self, request: RenderRequest, progress: DynProgressSink) -> RenderFuture {
        let result = self.render(request, progress.as_ref());
        Box::pin(async move { result })
    }
}

#[derive(Default)]
pub struct FakeArtifactStore {
    allocated: Mutex<Vec<PathBuf>>,
    discarded: Mutex<Vec<PathBuf>>,
}

impl FakeArtifactStore {
    pub fn allocated(&self) -> Vec<PathBuf> {
        self.allocated.lock().expect("artifact lock").clone()
    }

    pub fn discarded(&self) -> Vec<PathBuf> {
        self.discarded.lock().expect("artifact lock").clone()
    }
}

impl ArtifactStorePort for FakeArtifactStore {
    fn allocate(&self, slug: &str, theme_id: &str, format: OutputFormat) -> AppResult<PathBuf> {
        let path = PathBuf::from(format!("/posters/{slug}_{theme_id}.{format}"));
        self.allocated
            .lock()
            .expect("artifact lock")
            .push(path.clone());
        Ok(path)
    }

    fn discard(&self, path: &Path) {
        self.discarded
            .lock()
            .expect("artifact lock")
            .push(path.to_path_buf());
    }
}

/// Spawns on the test runtime and lets the test wait for every job.
#[derive(Default)]
pub struct JoiningSpawner {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl JoiningSpawner {
    pub async fn join_all(&self) {
        let handles: Vec<_> = self.handles.lock().expect("spawner lock").drain(..).collect();
        for handle in handles {
            handle.await.expect("job task panicked");
        }
    }
}

impl TaskSpawnPort for JoiningSpawner {
    fn spawn_job(&self, _job_id: JobId, future: JobFuture) {
        let handle = tokio::spawn(future);
        self.handles.lock().expect("spawner lock").push(handle);
    }
}
