use std::sync::Arc;

use domain::theme::ThemeSpec;

use crate::error::AppResult;

pub trait ThemeStorePort: Send + Sync {
    /// Sorted theme identifiers.
    fn list(&self) -> AppResult<Vec<String>>;

    fn load(&self, theme_id: &str) -> AppResult<Option<ThemeSpec>>;
}

pub type DynThemeStorePort = Arc<dyn ThemeStorePort>;
