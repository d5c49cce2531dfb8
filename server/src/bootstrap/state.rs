use std::sync::Arc;

use cityposter_adapters::outgoing::{
    artifacts_fs::FsArtifactStore,
    fs_cache::json_dir::JsonDirCache,
    osm_http::{OsmHttpProvider, OsmHttpSettings},
    render::PosterRenderer,
    theme_fs::JsonThemeStore,
    tokio_spawn::{
        TokioTaskSpawnAdapter, blocking_render::TokioBlockingRenderAdapter, sleeper::TokioSleeper,
    },
};
use cityposter_adapters::shared::app_state::AppState as AdaptersAppState;
use cityposter_application::config::{FetchSettings, PosterDefaults};
use cityposter_application::error::AppError;
use cityposter_application::fetch::{coordinator::ParallelFetchCoordinator, gateway::GeoDataGateway};
use cityposter_application::infrastructure_config::Config;
use cityposter_application::jobs::registry::JobRegistry;
use cityposter_application::ports::incoming::{
    posters::{PosterArtifactsUseCase, PosterJobsUseCase},
    themes::ThemesQueryUseCase,
};
use cityposter_application::ports::outgoing::{
    artifact_store::ArtifactStorePort, blocking_task::BlockingRenderPort,
    dataset_cache::DatasetCachePort, geo_provider::GeoProviderPort, renderer::PosterRendererPort,
    sleeper::SleeperPort, theme_store::ThemeStorePort,
};
use cityposter_application::posters::{
    pipeline::{PosterPipeline, PosterPipelineDeps},
    service::PosterJobService,
};
use cityposter_application::themes::catalog::ThemeCatalog;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<JobRegistry>,
    pub poster_service: Arc<PosterJobService>,
    pub theme_catalog: Arc<ThemeCatalog>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let config = Arc::new(config);
        let registry = Arc::new(JobRegistry::new());

        let gateway = Self::create_gateway(&config)?;
        let theme_catalog = Self::create_theme_catalog(&config);
        let poster_service = Self::create_poster_service(
            &config,
            &registry,
            gateway,
            &theme_catalog,
        );

        Ok(Self {
            config,
            registry,
            poster_service,
            theme_catalog,
        })
    }

    fn create_gateway(config: &Config) -> Result<Arc<GeoDataGateway>, AppError> {
        let cache_port: Arc<dyn DatasetCachePort> =
            Arc::new(JsonDirCache::new(&config.cache.dir).map_err(|e| AppError::ConfigError {
                message: format!("Failed to prepare cache directory {}: {e}", config.cache.dir),
            })?);
        let provider_port: Arc<dyn GeoProviderPort> = Arc::new(OsmHttpProvider::new(
            OsmHttpSettings::from_config(&config.provider)?,
        )?);
        let sleeper_port: Arc<dyn SleeperPort> = Arc::new(TokioSleeper);

        Ok(Arc::new(GeoDataGateway::new(
            cache_port,
            provider_port,
            sleeper_port,
            Arc::new(FetchSettings::from_config(config)),
        )))
    }

    fn create_theme_catalog(config: &Config) -> Arc<ThemeCatalog> {
        let theme_store: Arc<dyn ThemeStorePort> =
            Arc::new(JsonThemeStore::new(&config.posters.themes_dir));
        Arc::new(ThemeCatalog::new(
            theme_store,
            config.posters.default_theme.clone(),
        ))
    }

    fn create_poster_service(
        config: &Config,
        registry: &Arc<JobRegistry>,
        gateway: Arc<GeoDataGateway>,
        theme_catalog: &Arc<ThemeCatalog>,
    ) -> Arc<PosterJobService> {
        let renderer_port: Arc<dyn PosterRendererPort> =
            Arc::new(PosterRenderer::new(config.posters.max_raster_megapixels));
        let blocking_render: Arc<dyn BlockingRenderPort> =
            Arc::new(TokioBlockingRenderAdapter::new(renderer_port));
        let artifact_store: Arc<dyn ArtifactStorePort> =
            Arc::new(FsArtifactStore::new(&config.posters.output_dir));

        let pipeline = Arc::new(PosterPipeline::new(
            Arc::new(PosterDefaults::from_config(config)),
            PosterPipelineDeps {
                registry: Arc::clone(registry),
                coordinator: ParallelFetchCoordinator::new(gateway),
                themes: Arc::clone(theme_catalog),
                renderer: blocking_render,
                artifacts: artifact_store,
            },
        ));

        Arc::new(PosterJobService::new(
            pipeline,
            Arc::clone(registry),
            Arc::new(TokioTaskSpawnAdapter::new()),
        ))
    }

    pub fn to_adapters_state(self) -> AdaptersAppState {
        AdaptersAppState::new(
            self.config,
            Arc::clone(&self.poster_service) as Arc<dyn PosterJobsUseCase>,
            self.poster_service as Arc<dyn PosterArtifactsUseCase>,
            self.theme_catalog as Arc<dyn ThemesQueryUseCase>,
        )
    }
}
