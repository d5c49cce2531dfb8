use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{debug, warn};
use uuid::Uuid;

use cityposter_application::error::{AppError, AppResult};
use cityposter_application::ports::outgoing::artifact_store::ArtifactStorePort;
use domain::poster::OutputFormat;

/// Rendered posters live in one flat output directory.
pub struct FsArtifactStore {
    output_dir: PathBuf,
}

impl FsArtifactStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// `{slug}_{theme}_{YYYYmmdd_HHMMSS}_{suffix}.{ext}`; the suffix keeps
/// concurrent jobs for the same city from colliding within one second.
fn file_name(slug: &str, theme_id: &str, format: OutputFormat, at: OffsetDateTime) -> AppResult<String> {
    let stamp = at
        .format(format_description!("[year][month][day]_[hour][minute][second]"))
        .map_err(|e| AppError::TaskError {
            message: format!("Failed to format output timestamp: {e}"),
        })?;
    let suffix = Uuid::new_v4().simple().to_string();
    let short = suffix.get(..8).unwrap_or(&suffix);
    Ok(format!("{slug}_{theme_id}_{stamp}_{short}.{}", format.extension()))
}

impl ArtifactStorePort for FsArtifactStore {
    fn allocate(&self, slug: &str, theme_id: &str, format: OutputFormat) -> AppResult<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let name = file_name(slug, theme_id, format, OffsetDateTime::now_utc())?;
        Ok(self.output_dir.join(name))
    }

    fn discard(&self, path: &Path) {
        match fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "Discarded partial poster"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to discard poster file"),
        }
    }
}
