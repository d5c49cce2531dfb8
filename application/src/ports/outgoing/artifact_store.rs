use std::path::{Path, PathBuf};
use std::sync::Arc;

use domain::poster::OutputFormat;

use crate::error::AppResult;

/// Output directory holding rendered posters until they are downloaded.
pub trait ArtifactStorePort: Send + Sync {
    /// Reserves a fresh path named `{slug}_{theme}_{timestamp}.{ext}`.
    fn allocate(&self, slug: &str, theme_id: &str, format: OutputFormat) -> AppResult<PathBuf>;

    /// Best-effort removal of a file left behind by a failed job.
    fn discard(&self, path: &Path);
}

pub type DynArtifactStorePort = Arc<dyn ArtifactStorePort>;
