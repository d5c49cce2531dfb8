use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, instrument};

use domain::cache_key::BoundaryScope;
use domain::fetch_spec::FetchSpec;
use domain::job::{JobId, Phase, PosterArtifact, StatusUpdate};
use domain::poster::{ArtifactDescriptor, PosterLabels};

use crate::config::PosterDefaults;
use crate::error::{AppError, AppResult};
use crate::fetch::coordinator::ParallelFetchCoordinator;
use crate::jobs::{progress::JobProgressSink, registry::JobRegistry};
use crate::ports::outgoing::{
    artifact_store::DynArtifactStorePort,
    blocking_task::DynBlockingRenderPort,
    progress::{DynProgressSink, ProgressSink},
    renderer::RenderRequest,
};
use crate::posters::request::{LocationQuery, PosterPlan, PosterRequest, download_name};
use crate::themes::catalog::ThemeCatalog;

pub struct PosterPipelineDeps {
    pub registry: Arc<JobRegistry>,
    pub coordinator: ParallelFetchCoordinator,
    pub themes: Arc<ThemeCatalog>,
    pub renderer: DynBlockingRenderPort,
    pub artifacts: DynArtifactStorePort,
}

/// Runs one poster job from validation to the last rendered theme.
pub struct PosterPipeline {
    defaults: Arc<PosterDefaults>,
    registry: Arc<JobRegistry>,
    coordinator: ParallelFetchCoordinator,
    themes: Arc<ThemeCatalog>,
    renderer: DynBlockingRenderPort,
    artifacts: DynArtifactStorePort,
}

fn ensure_running(progress: &dyn ProgressSink) -> AppResult<()> {
    if progress.is_cancelled() {
        Err(AppError::Cancelled)
    } else {
        Ok(())
    }
}

impl PosterPipeline {
    pub fn new(defaults: Arc<PosterDefaults>, deps: PosterPipelineDeps) -> Self {
        Self {
            defaults,
            registry: deps.registry,
            coordinator: deps.coordinator,
            themes: deps.themes,
            renderer: deps.renderer,
            artifacts: deps.artifacts,
        }
    }

    /// Drives the job to exactly one terminal status. Files written before a
    /// failure are discarded.
    #[instrument(skip(self, request))]
    pub async fn run(&self, job_id: JobId, request: PosterRequest) {
        let progress: DynProgressSink =
            Arc::new(JobProgressSink::new(Arc::clone(&self.registry), job_id));
        let mut written = Vec::new();

        match self.execute(&request, &progress, &mut written).await {
            Ok(artifacts) => {
                info!(files = artifacts.len(), "Poster job completed");
                progress.report(StatusUpdate::completed(artifacts, "Poster created!"));
            }
            Err(e) => {
                for path in &written {
                    self.artifacts.discard(path);
                }
                let message = match &e {
                    AppError::Cancelled => {
                        info!("Poster job cancelled");
                        e.to_string()
                    }
                    _ => {
                        error!(error = %e, "Poster job failed");
                        format!("Error while creating poster: {e}")
                    }
                };
                progress.report(StatusUpdate::failed(e.failure_kind(), message));
            }
        }
    }

    async fn execute(
        &self,
        request: &PosterRequest,
        progress: &DynProgressSink,
        written: &mut Vec<PathBuf>,
    ) -> AppResult<Vec<PosterArtifact>> {
        progress.report(StatusUpdate::phase(Phase::Validating, "Validating input..."));
        self.themes
            .check(request.theme.as_deref(), request.custom_theme.as_ref())?;
        let plan = PosterPlan::from_request(request, &self.defaults)?;

        progress.report(StatusUpdate::phase(Phase::LoadingTheme, "Loading theme..."));
        let themes = self.themes.select(
            request.theme.as_deref(),
            request.custom_theme.as_ref(),
            request.all_themes,
        )?;

        let (spec, labels) = self
            .locate(&plan.location, plan.distance_m, progress.as_ref())
            .await?;
        ensure_running(progress.as_ref())?;

        progress.report(StatusUpdate::phase(
            Phase::FetchingData,
            "Downloading map data...",
        ));
        let bundle = self.coordinator.fetch_all(&spec, progress.as_ref()).await?;

        let boundary = match &spec {
            FetchSpec::Boundary(boundary) => Some(Arc::clone(boundary)),
            FetchSpec::Radius { .. } => None,
        };
        let format = plan.canvas.format;
        let slug = labels.slug();
        let mut artifacts = Vec::with_capacity(themes.len());

        for (index, (theme_id, theme)) in themes.into_iter().enumerate() {
            ensure_running(progress.as_ref())?;
            let output_path = self.artifacts.allocate(&slug, &theme_id, format)?;
            written.push(output_path.clone());

            let render = RenderRequest {
                bundle: bundle.clone(),
                theme_id: theme_id.clone(),
                theme,
                canvas: plan.canvas.clone(),
                labels: labels.clone(),
                boundary: boundary.clone(),
                output_path: output_path.clone(),
            };
            self.renderer
                .render_blocking(render, Arc::clone(progress))
                .await?;

            artifacts.push(PosterArtifact {
                download_name: download_name(&plan.download_location, &theme_id, format),
                location: plan.download_location.clone(),
                descriptor: ArtifactDescriptor {
                    index,
                    theme: theme_id,
                    format,
                },
                path: output_path,
            });
        }

        Ok(artifacts)
    }

    /// Turns the chosen location source into a fetch area and poster labels.
    async fn locate(
        &self,
        query: &LocationQuery,
        distance_m: u32,
        progress: &dyn ProgressSink,
    ) -> AppResult<(FetchSpec, PosterLabels)> {
        let gateway = self.coordinator.gateway();

        let (spec, mut labels) = match query {
            LocationQuery::Coordinates {
                point,
                city_label,
                country_label,
            } => (
                FetchSpec::radius(*point, distance_m)?,
                PosterLabels {
                    city: city_label.clone(),
                    country: country_label.clone(),
                    point: None,
                },
            ),
            LocationQuery::Subdistrict { name } => {
                progress.report(StatusUpdate::phase(
                    Phase::FetchingBoundary,
                    format!("Fetching boundary for subdistrict: {name}"),
                ));
                let boundary = gateway.lookup_boundary(BoundaryScope::Region, name).await?;
                (
                    FetchSpec::Boundary(boundary),
                    PosterLabels::from_place_name(name, None),
                )
            }
            LocationQuery::CityBoundary { city, country } => {
                let place = format!("{city}, {country}");
                progress.report(StatusUpdate::phase(
                    Phase::FetchingBoundary,
                    format!("Fetching boundary for {place}"),
                ));
                let boundary = gateway.lookup_boundary(BoundaryScope::City, &place).await?;
                (
                    FetchSpec::Boundary(boundary),
                    PosterLabels::from_place_name(&place, None),
                )
            }
            LocationQuery::CountryBoundary { country } => {
                progress.report(StatusUpdate::phase(
                    Phase::FetchingBoundary,
                    format!("Fetching boundary for {country}"),
                ));
                let boundary = gateway.lookup_boundary(BoundaryScope::City, country).await?;
                (
                    FetchSpec::Boundary(boundary),
                    PosterLabels::from_place_name(country, None),
                )
            }
            LocationQuery::Geocode { city, country } => {
                progress.report(StatusUpdate::phase(
                    Phase::Geocoding,
                    format!("Looking up coordinates for {city}, {country}"),
                ));
                let point = gateway.lookup_coordinates(city, country).await?;
                (
                    FetchSpec::radius(point, distance_m)?,
                    PosterLabels {
                        city: city.clone(),
                        country: country.clone(),
                        point: None,
                    },
                )
            }
        };

        labels.point = spec.display_point();
        Ok((spec, labels))
    }
}
