use std::sync::Arc;

use cityposter_application::infrastructure_config::Config;
use cityposter_application::ports::incoming::{
    posters::{PosterArtifactsUseCase, PosterJobsUseCase},
    themes::ThemesQueryUseCase,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub poster_jobs: Arc<dyn PosterJobsUseCase>,
    pub poster_artifacts: Arc<dyn PosterArtifactsUseCase>,
    pub themes: Arc<dyn ThemesQueryUseCase>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        poster_jobs: Arc<dyn PosterJobsUseCase>,
        poster_artifacts: Arc<dyn PosterArtifactsUseCase>,
        themes: Arc<dyn ThemesQueryUseCase>,
    ) -> Self {
        Self {
            config,
            poster_jobs,
            poster_artifacts,
            themes,
        }
    }
}
