use futures::FutureExt;
use std::sync::Arc;
use tracing::{info, instrument};

use domain::job::{JobId, JobSnapshot, PosterArtifact};

use crate::error::{AppError, AppResult};
use crate::jobs::registry::JobRegistry;
use crate::ports::incoming::posters::{PosterArtifactsUseCase, PosterBundle, PosterJobsUseCase};
use crate::ports::outgoing::task_spawn::DynTaskSpawnPort;
use crate::posters::pipeline::PosterPipeline;
use crate::posters::request::{PosterRequest, archive_name};

pub struct PosterJobService {
    pipeline: Arc<PosterPipeline>,
    registry: Arc<JobRegistry>,
    task_spawn: DynTaskSpawnPort,
}

impl PosterJobService {
    pub fn new(
        pipeline: Arc<PosterPipeline>,
        registry: Arc<JobRegistry>,
        task_spawn: DynTaskSpawnPort,
    ) -> Self {
        Self {
            pipeline,
            registry,
            task_spawn,
        }
    }

    fn not_found(job_id: JobId) -> AppError {
        AppError::NotFound {
            message: format!("Job {job_id} not found"),
        }
    }

    fn file_not_found() -> AppError {
        AppError::NotFound {
            message: "File not found".to_string(),
        }
    }

    /// Non-empty artifact list of a completed job.
    fn completed_artifacts(&self, job_id: JobId) -> AppResult<Vec<PosterArtifact>> {
        self.registry
            .completed_artifacts(job_id)
            .filter(|artifacts| !artifacts.is_empty())
            .ok_or_else(Self::file_not_found)
    }
}

impl PosterJobsUseCase for PosterJobService {
    #[instrument(skip(self, request))]
    fn submit_job(&self, request: PosterRequest) -> AppResult<JobId> {
        let job_id = JobId::new();
        self.registry.create(job_id, "Starting poster creation...");

        let pipeline = Arc::clone(&self.pipeline);
        self.task_spawn.spawn_job(
            job_id,
            async move { pipeline.run(job_id, request).await }.boxed(),
        );

        info!(%job_id, "Poster job submitted");
        Ok(job_id)
    }

    fn job_status(&self, job_id: JobId) -> AppResult<JobSnapshot> {
        self.registry
            .snapshot(job_id)
            .ok_or_else(|| Self::not_found(job_id))
    }

    #[instrument(skip(self))]
    fn cancel_job(&self, job_id: JobId) -> AppResult<()> {
        if self.registry.cancel(job_id) {
            info!("Cancellation requested");
            Ok(())
        } else {
            Err(Self::not_found(job_id))
        }
    }

    fn job_count(&self) -> usize {
        self.registry.len()
    }
}

impl PosterArtifactsUseCase for PosterJobService {
    fn artifact(&self, job_id: JobId, index: i64) -> AppResult<PosterArtifact> {
        let artifacts = self.completed_artifacts(job_id)?;
        let last = artifacts.len().saturating_sub(1);
        let index = usize::try_from(index.max(0)).unwrap_or(last).min(last);

        artifacts
            .into_iter()
            .nth(index)
            .ok_or_else(Self::file_not_found)
    }

    fn artifact_bundle(&self, job_id: JobId) -> AppResult<PosterBundle> {
        let artifacts = self.completed_artifacts(job_id)?;
        let location = artifacts
            .first()
            .map(|artifact| artifact.location.as_str())
            .ok_or_else(Self::file_not_found)?;

        Ok(PosterBundle {
            archive_name: archive_name(location),
            artifacts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FetchSettings, PosterDefaults};
    use crate::fetch::coordinator::ParallelFetchCoordinator;
    use crate::fetch::gateway::GeoDataGateway;
    use crate::posters::pipeline::PosterPipelineDeps;
    use crate::test_support::{
        FakeArtifactStore, FakeCache, FakeProvider, FakeRenderer, FakeThemeStore, InstantSleeper,
        JoiningSpawner, sample_boundary, sample_features, sample_graph,
    };
    use crate::themes::catalog::ThemeCatalog;
    use domain::dataset::DatasetKind;
    use domain::job::{JobFailureKind, Phase};
    use domain::poster::OutputFormat;
    use domain::theme::DEFAULT_THEME_ID;

    struct Harness {
        service: PosterJobService,
        registry: Arc<JobRegistry>,
        provider: Arc<FakeProvider>,
        renderer: Arc<FakeRenderer>,
        artifacts: Arc<FakeArtifactStore>,
        spawner: Arc<JoiningSpawner>,
    }

    impl Harness {
        fn new(provider: FakeProvider, renderer: FakeRenderer) -> Self {
            let registry = Arc::new(JobRegistry::new());
            let provider = Arc::new(provider);
            let renderer = Arc::new(renderer);
            let artifacts = Arc::new(FakeArtifactStore::default());
            let spawner = Arc::new(JoiningSpawner::default());

            let gateway = GeoDataGateway::new(
                Arc::new(FakeCache::default()),
                Arc::clone(&provider) as _,
                Arc::new(InstantSleeper::default()),
                Arc::new(FetchSettings::default()),
            );
            let pipeline = PosterPipeline::new(
                Arc::new(PosterDefaults::default()),
                PosterPipelineDeps {
                    registry: Arc::clone(&registry),
                    coordinator: ParallelFetchCoordinator::new(Arc::new(gateway)),
                    themes: Arc::new(ThemeCatalog::new(
                        Arc::new(FakeThemeStore::with_themes(&["noir", "blueprint"])),
                        DEFAULT_THEME_ID,
                    )),
                    renderer: Arc::clone(&renderer) as _,
                    artifacts: Arc::clone(&artifacts) as _,
                },
            );
            let service = PosterJobService::new(
                Arc::new(pipeline),
                Arc::clone(&registry),
                Arc::clone(&spawner) as _,
            );

            Self {
                service,
                registry,
                provider,
                renderer,
                artifacts,
                spawner,
            }
        }

        fn standard() -> Self {
            Self::new(
                FakeProvider::with_graph(sample_graph())
                    .with_features(sample_features())
                    .with_boundary(sample_boundary()),
                FakeRenderer::default(),
            )
        }

        async fn run(&self, request: PosterRequest) -> JobSnapshot {
            let job_id = self.service.submit_job(request).expect("submitted");
            self.spawner.join_all().await;
            self.service.job_status(job_id).expect("job exists")
        }
    }

    fn coordinates_request() -> PosterRequest {
        PosterRequest {
            use_coordinates: true,
            latitude: Some(-6.2),
            longitude: Some(106.8),
            custom_city: Some("Jakarta".to_string()),
            custom_country: Some("Indonesia".to_string()),
            theme: Some("noir".to_string()),
            ..PosterRequest::default()
        }
    }

    #[tokio::test]
    async fn completed_job_lists_one_file_per_theme() {
        let harness = Harness::standard();

        let snapshot = harness.run(coordinates_request()).await;

        assert_eq!(snapshot.status, Phase::Completed);
        assert_eq!(snapshot.percent, 100);
        assert_eq!(snapshot.files.len(), 1);
        assert_eq!(snapshot.files[0].theme, "noir");
        assert_eq!(snapshot.files[0].format, OutputFormat::Png);
        assert_eq!(snapshot.cache_hits.get(&DatasetKind::Streets), Some(&false));
        assert_eq!(snapshot.details.get(&DatasetKind::Parks), Some(&100));
        assert!(snapshot.failure.is_none());

        let artifact = harness
            .service
            .artifact(snapshot.task_id, 0)
            .expect("artifact available");
        assert_eq!(artifact.download_name, "poster_Jakarta_noir.png");
    }

    #[tokio::test]
    async fn all_themes_fetch_once_and_render_each_theme() {
        let harness = Harness::standard();
        let request = PosterRequest {
            all_themes: true,
            ..coordinates_request()
        };

        let snapshot = harness.run(request).await;

        let themes: Vec<&str> = snapshot.files.iter().map(|f| f.theme.as_str()).collect();
        assert_eq!(themes, vec!["blueprint", "feature_based", "noir"]);
        assert_eq!(harness.provider.street_calls(), 1);
        assert_eq!(harness.renderer.rendered_themes(), themes);
    }

    #[tokio::test]
    async fn unknown_theme_fails_before_any_fetch() {
        let harness = Harness::standard();
        let request = PosterRequest {
            theme: Some("sepia".to_string()),
            ..coordinates_request()
        };

        let snapshot = harness.run(request).await;

        assert_eq!(snapshot.status, Phase::Error);
        let failure = snapshot.failure.expect("failure recorded");
        assert_eq!(failure.kind, JobFailureKind::InvalidInput);
        assert!(failure.message.contains("sepia"));
        assert_eq!(harness.provider.street_calls(), 0);
    }

    #[tokio::test]
    async fn render_failure_discards_written_files() {
        let harness = Harness::new(
            FakeProvider::with_graph(sample_graph()),
            FakeRenderer::failing_on("blueprint"),
        );
        let request = PosterRequest {
            all_themes: true,
            ..coordinates_request()
        };

        let snapshot = harness.run(request).await;

        assert_eq!(
            snapshot.failure.map(|failure| failure.kind),
            Some(JobFailureKind::RenderFailure)
        );
        assert!(snapshot.files.is_empty());
        assert_eq!(harness.artifacts.allocated(), harness.artifacts.discarded());
        assert!(harness.service.artifact(snapshot.task_id, 0).is_err());
    }

    #[tokio::test]
    async fn cancelled_job_ends_in_distinguishable_error() {
        let harness = Harness::new(
            FakeProvider::with_graph(sample_graph()),
            FakeRenderer::default(),
        );
        let job_id = harness
            .service
            .submit_job(coordinates_request())
            .expect("submitted");
        harness.service.cancel_job(job_id).expect("job known");
        harness.spawner.join_all().await;

        let snapshot = harness.service.job_status(job_id).expect("job exists");

        assert_eq!(snapshot.status, Phase::Error);
        assert_eq!(snapshot.message, "Cancelled by user");
        assert!(snapshot.cancelled);
        assert_eq!(
            snapshot.failure.map(|failure| failure.kind),
            Some(JobFailureKind::Cancelled)
        );
        assert_eq!(harness.provider.street_calls(), 0);
        assert!(harness.renderer.rendered_themes().is_empty());
    }

    #[tokio::test]
    async fn subdistrict_renders_inside_its_boundary() {
        let harness = Harness::standard();
        let request = PosterRequest {
            subdistrict: Some("Coblong, Bandung, Indonesia".to_string()),
            theme: Some("noir".to_string()),
            ..PosterRequest::default()
        };

        let snapshot = harness.run(request).await;

        assert_eq!(snapshot.status, Phase::Completed);
        let rendered = harness.renderer.last_request().expect("rendered");
        assert_eq!(rendered.labels.city, "Coblong");
        assert_eq!(rendered.labels.country, "Bandung, Indonesia");
        assert!(rendered.boundary.is_some());
        assert!(rendered.labels.point.is_some());
    }

    #[tokio::test]
    async fn missing_boundary_fails_with_data_unavailable() {
        let harness = Harness::new(
            FakeProvider::with_graph(sample_graph()),
            FakeRenderer::default(),
        );
        let request = PosterRequest {
            country: Some("Atlantis".to_string()),
            ..PosterRequest::default()
        };

        let snapshot = harness.run(request).await;

        let failure = snapshot.failure.expect("failure recorded");
        assert_eq!(failure.kind, JobFailureKind::DataUnavailable);
        assert!(failure.message.contains("Atlantis"));
    }

    #[tokio::test]
    async fn artifact_index_is_clamped() {
        let harness = Harness::standard();
        let snapshot = harness
            .run(PosterRequest {
                all_themes: true,
                ..coordinates_request()
            })
            .await;

        let last = harness
            .service
            .artifact(snapshot.task_id, 99)
            .expect("clamped to last");
        let first = harness
            .service
            .artifact(snapshot.task_id, -3)
            .expect("clamped to first");

        assert_eq!(last.descriptor.theme, "noir");
        assert_eq!(first.descriptor.theme, "blueprint");
    }

    #[tokio::test]
    async fn bundle_lists_every_theme_under_one_archive_name() {
        let harness = Harness::standard();
        let snapshot = harness
            .run(PosterRequest {
                all_themes: true,
                ..coordinates_request()
            })
            .await;

        let bundle = harness
            .service
            .artifact_bundle(snapshot.task_id)
            .expect("completed job has a bundle");

        let themes: Vec<_> = bundle
            .artifacts
            .iter()
            .map(|artifact| artifact.descriptor.theme.as_str())
            .collect();
        assert_eq!(themes, vec!["blueprint", "feature_based", "noir"]);
        assert_eq!(bundle.archive_name, "poster_Jakarta_all_themes.zip");
    }

    #[test]
    fn bundle_of_unknown_job_is_not_found() {
        let harness = Harness::standard();

        assert!(matches!(
            harness.service.artifact_bundle(JobId::new()),
            Err(AppError::NotFound { .. })
        ));
    }

    #[test]
    fn unknown_jobs_are_not_found() {
        let harness = Harness::standard();
        let job_id = JobId::new();

        assert!(matches!(
            harness.service.job_status(job_id),
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            harness.service.cancel_job(job_id),
            Err(AppError::NotFound { .. })
        ));
        assert!(harness.registry.is_empty());
    }
}
