use tracing::debug;

use domain::theme::{CUSTOM_THEME_ID, DEFAULT_THEME_ID, ThemeSpec, validate_theme_id};

use crate::error::{AppError, AppResult};
use crate::ports::incoming::themes::ThemesQueryUseCase;
use crate::ports::outgoing::theme_store::DynThemeStorePort;

/// Themes selected for one job, in render order.
pub type ThemeSelection = Vec<(String, ThemeSpec)>;

pub struct ThemeCatalog {
    store: DynThemeStorePort,
    default_theme: String,
}

impl ThemeCatalog {
    pub fn new(store: DynThemeStorePort, default_theme: impl Into<String>) -> Self {
        Self {
            store,
            default_theme: default_theme.into(),
        }
    }

    /// Stored themes plus the built-in default, sorted and deduplicated.
    pub fn list(&self) -> AppResult<Vec<String>> {
        let mut themes = self.store.list()?;
        themes.push(DEFAULT_THEME_ID.to_string());
        themes.sort();
        themes.dedup();
        Ok(themes)
    }

    pub fn load(&self, theme_id: &str) -> AppResult<ThemeSpec> {
        validate_theme_id(theme_id)?;
        match self.store.load(theme_id)? {
            Some(theme) => Ok(theme),
            None if theme_id == DEFAULT_THEME_ID => Ok(ThemeSpec::feature_based()),
            None => Err(AppError::ThemeNotFound {
                name: theme_id.to_string(),
            }),
        }
    }

    /// Checks the requested theme exists without loading it.
    pub fn check(&self, theme: Option<&str>, custom: Option<&ThemeSpec>) -> AppResult<()> {
        let theme_id = theme.unwrap_or(self.default_theme.as_str());
        if theme_id == CUSTOM_THEME_ID {
            return match custom {
                Some(_) => Ok(()),
                None => Err(AppError::InvalidInput {
                    message: "Custom theme selected without theme colours".to_string(),
                }),
            };
        }
        if self.list()?.iter().any(|id| id == theme_id) {
            Ok(())
        } else {
            Err(AppError::ThemeNotFound {
                name: theme_id.to_string(),
            })
        }
    }

    /// Resolves the request's theme choice. `all` renders every available
    /// theme and is ignored for a custom theme.
    pub fn select(
        &self,
        theme: Option<&str>,
        custom: Option<&ThemeSpec>,
        all: bool,
    ) -> AppResult<ThemeSelection> {
        self.check(theme, custom)?;
        let theme_id = theme.unwrap_or(self.default_theme.as_str());

        if theme_id == CUSTOM_THEME_ID {
            let custom = custom.cloned().ok_or_else(|| AppError::InvalidInput {
                message: "Custom theme selected without theme colours".to_string(),
            })?;
            return Ok(vec![(CUSTOM_THEME_ID.to_string(), custom)]);
        }

        let ids = if all {
            self.list()?
        } else {
            vec![theme_id.to_string()]
        };
        debug!(count = ids.len(), "Loading poster themes");

        ids.into_iter()
            .map(|id| {
                let theme = self.load(&id)?;
                Ok((id, theme))
            })
            .collect()
    }
}

impl ThemesQueryUseCase for ThemeCatalog {
    fn list_themes(&self) -> AppResult<Vec<String>> {
        self.list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeThemeStore;
    use std::sync::Arc;

    fn catalog() -> ThemeCatalog {
        ThemeCatalog::new(
            Arc::new(FakeThemeStore::with_themes(&["noir", "blueprint"])),
            DEFAULT_THEME_ID,
        )
    }

    #[test]
    fn list_always_contains_the_default_theme() {
        assert_eq!(
            catalog().list().expect("listed"),
            vec!["blueprint", "feature_based", "noir"]
        );
    }

    #[test]
    fn default_theme_falls_back_to_builtin() {
        let theme = catalog().load(DEFAULT_THEME_ID).expect("built-in");
        assert_eq!(theme, ThemeSpec::feature_based());
    }

    #[test]
    fn unknown_theme_is_rejected_before_loading() {
        let err = catalog()
            .select(Some("sepia"), None, false)
            .expect_err("unknown theme");
        assert!(matches!(err, AppError::ThemeNotFound { ref name } if name == "sepia"));
    }

    #[test]
    fn all_themes_renders_every_theme_in_order() {
        let selection = catalog().select(Some("noir"), None, true).expect("selected");
        let ids: Vec<&str> = selection.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["blueprint", "feature_based", "noir"]);
    }

    #[test]
    fn custom_theme_ignores_all_themes() {
        let mut custom = ThemeSpec::feature_based();
        custom.name = "Mine".to_string();

        let selection = catalog()
            .select(Some(CUSTOM_THEME_ID), Some(&custom), true)
            .expect("selected");

        assert_eq!(selection, vec![(CUSTOM_THEME_ID.to_string(), custom)]);
    }

    #[test]
    fn custom_theme_without_colours_is_invalid() {
        let err = catalog()
            .select(Some(CUSTOM_THEME_ID), None, false)
            .expect_err("missing colours");
        assert!(matches!(err, AppError::InvalidInput { .. }));
    }
}
