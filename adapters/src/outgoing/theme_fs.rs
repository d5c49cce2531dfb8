//! Theme palettes read from `{dir}/{id}.json`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use cityposter_application::error::{AppError, AppResult};
use cityposter_application::ports::outgoing::theme_store::ThemeStorePort;
use domain::theme::{ThemeSpec, validate_theme_id};

pub struct JsonThemeStore {
    dir: PathBuf,
}

impl JsonThemeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ThemeStorePort for JsonThemeStore {
    fn list(&self) -> AppResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(dir = %self.dir.display(), "Themes directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if validate_theme_id(stem).is_ok() {
                ids.push(stem.to_string());
            } else {
                debug!(file = %path.display(), "Skipping theme file with unusable name");
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn load(&self, theme_id: &str) -> AppResult<Option<ThemeSpec>> {
        validate_theme_id(theme_id)?;
        let path = self.dir.join(format!("{theme_id}.json"));

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AppError::IoError(e)),
        };
        let theme: ThemeSpec = serde_json::from_slice(&bytes)?;
        debug!(theme_id, name = %theme.name, "Theme loaded");
        Ok(Some(theme))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::color::RgbColor;
    use tempfile::TempDir;

    fn write_theme(dir: &Path, id: &str, theme: &ThemeSpec) {
        let json = serde_json::to_vec_pretty(theme).expect("theme serializes");
        fs::write(dir.join(format!("{id}.json")), json).expect("theme written");
    }

    #[test]
    fn lists_sorted_json_stems_only() {
        let dir = TempDir::new().expect("temp dir");
        write_theme(dir.path(), "noir", &ThemeSpec::feature_based());
        write_theme(dir.path(), "blueprint", &ThemeSpec::feature_based());
        fs::write(dir.path().join("README.md"), "not a theme").expect("written");
        fs::write(dir.path().join("bad name.json"), "{}").expect("written");

        let store = JsonThemeStore::new(dir.path());

        assert_eq!(store.list().expect("listed"), vec!["blueprint", "noir"]);
    }

    #[test]
    fn missing_directory_lists_nothing() {
        let dir = TempDir::new().expect("temp dir");
        let store = JsonThemeStore::new(dir.path().join("absent"));

        assert!(store.list().expect("listed").is_empty());
    }

    #[test]
    fn loads_theme_by_id() {
        let dir = TempDir::new().expect("temp dir");
        let mut theme = ThemeSpec::feature_based();
        theme.name = "Noir".to_string();
        theme.bg = RgbColor::BLACK;
        write_theme(dir.path(), "noir", &theme);

        let store = JsonThemeStore::new(dir.path());

        assert_eq!(store.load("noir").expect("loaded"), Some(theme));
        assert_eq!(store.load("missing").expect("no error"), None);
    }

    #[test]
    fn malformed_theme_is_a_json_error() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("broken.json"), "{\"bg\": ").expect("written");

        let err = JsonThemeStore::new(dir.path())
            .load("broken")
            .expect_err("malformed");

        assert!(matches!(err, AppError::JsonError(_)));
    }

    #[test]
    fn path_like_ids_are_rejected_before_touching_disk() {
        let dir = TempDir::new().expect("temp dir");

        let err = JsonThemeStore::new(dir.path())
            .load("../secrets")
            .expect_err("rejected");

        assert!(matches!(err, AppError::Domain(_)));
    }
}
