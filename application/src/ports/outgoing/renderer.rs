use std::path::PathBuf;
use std::sync::Arc;

use domain::dataset::DatasetBundle;
use domain::geometry::Boundary;
use domain::poster::{CanvasSpec, PosterLabels};
use domain::theme::ThemeSpec;

use crate::error::AppResult;
use crate::ports::outgoing::progress::ProgressSink;

/// Everything needed to draw one poster for one theme.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub bundle: DatasetBundle,
    pub theme_id: String,
    pub theme: ThemeSpec,
    pub canvas: CanvasSpec,
    pub labels: PosterLabels,
    pub boundary: Option<Arc<Boundary>>,
    pub output_path: PathBuf,
}

/// CPU-bound poster renderer. Reports one render phase before each layer and
/// returns `AppError::Cancelled` when the sink reports cancellation between layers.
pub trait PosterRendererPort: Send + Sync {
    fn render(&self, request: &RenderRequest, progress: &dyn ProgressSink) -> AppResult<()>;
}

pub type DynPosterRendererPort = Arc<dyn PosterRendererPort>;
