use std::sync::Arc;
use tokio::task::spawn_blocking;

use cityposter_application::error::AppError;
use cityposter_application::ports::outgoing::{
    blocking_task::{BlockingRenderPort, RenderFuture},
    progress::DynProgressSink,
    renderer::{DynPosterRendererPort, RenderRequest},
};

/// Runs the CPU-bound renderer on tokio's blocking pool.
pub struct TokioBlockingRenderAdapter {
    renderer: DynPosterRendererPort,
}

impl TokioBlockingRenderAdapter {
    pub fn new(renderer: DynPosterRendererPort) -> Self {
        Self { renderer }
    }
}

impl BlockingRenderPort for TokioBlockingRenderAdapter {
    fn render_blocking(&self, request: RenderRequest, progress: DynProgressSink) -> RenderFuture {
        let renderer = Arc::clone(&self.renderer);

        Box::pin(async move {
            spawn_blocking(move || renderer.render(&request, progress.as_ref()))
                .await
                .map_err(|e| AppError::TaskError {
                    message: format!("Render task failed: {e}"),
                })?
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityposter_application::error::AppResult;
    use cityposter_application::ports::outgoing::progress::ProgressSink;
    use cityposter_application::ports::outgoing::renderer::PosterRendererPort;
    use domain::coords::GeoPoint;
    use domain::dataset::{DatasetBundle, StreetGraph};
    use domain::job::{Phase, StatusUpdate};
    use domain::poster::{CanvasSpec, OutputFormat, PosterLabels};
    use domain::theme::ThemeSpec;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct Sink {
        phases: Mutex<Vec<Phase>>,
        cancelled: AtomicBool,
    }

    impl ProgressSink for Sink {
        fn report(&self, update: StatusUpdate) {
            if let Some(phase) = update.phase {
                self.phases.lock().expect("sink lock").push(phase);
            }
        }

        fn is_cancelled(&self) -> bool {
            self.cancelled.load(Ordering::SeqCst)
        }
    }

    struct StepRenderer {
        panic: bool,
    }

    impl PosterRendererPort for StepRenderer {
        fn render(&self, _request: &RenderRequest, progress: &dyn ProgressSink) -> AppResult<()> {
            assert!(!self.panic, "renderer blew up");
            progress.report(StatusUpdate::phase(Phase::RenderSetup, "setup"));
            if progress.is_cancelled() {
                return Err(AppError::Cancelled);
            }
            progress.report(StatusUpdate::phase(Phase::RenderSave, "save"));
            Ok(())
        }
    }

    fn request() -> RenderRequest {
        RenderRequest {
            bundle: DatasetBundle {
                streets: Arc::new(StreetGraph::default()),
                water: None,
                parks: None,
            },
            theme_id: "feature_based".to_string(),
            theme: ThemeSpec::feature_based(),
            canvas: CanvasSpec::new(10.0, 10.0, 72, OutputFormat::Png).expect("canvas"),
            labels: PosterLabels {
                city: "Paris".to_string(),
                country: "France".to_string(),
                point: Some(GeoPoint { lat: 48.85, lon: 2.35 }),
            },
            boundary: None,
            output_path: PathBuf::from("unused.png"),
        }
    }

    #[tokio::test]
    async fn render_runs_off_the_executor_and_reports_progress() {
        let adapter = TokioBlockingRenderAdapter::new(Arc::new(StepRenderer { panic: false }));
        let sink = Arc::new(Sink::default());

        adapter
            .render_blocking(request(), Arc::clone(&sink) as DynProgressSink)
            .await
            .expect("rendered");

        assert_eq!(
            *sink.phases.lock().expect("sink lock"),
            vec![Phase::RenderSetup, Phase::RenderSave]
        );
    }

    #[tokio::test]
    async fn cancellation_surfaces_from_the_blocking_task() {
        let adapter = TokioBlockingRenderAdapter::new(Arc::new(StepRenderer { panic: false }));
        let sink = Arc::new(Sink::default());
        sink.cancelled.store(true, Ordering::SeqCst);

        let err = adapter
            .render_blocking(request(), sink)
            .await
            .expect_err("cancelled");

        assert!(matches!(err, AppError::Cancelled));
    }

    #[tokio::test]
    async fn panicking_render_becomes_a_task_error() {
        let adapter = TokioBlockingRenderAdapter::new(Arc::new(StepRenderer { panic: true }));

        let err = adapter
            .render_blocking(request(), Arc::new(Sink::default()))
            .await
            .expect_err("panicked");

        assert!(matches!(err, AppError::TaskError { .. }));
    }
}
