use crate::error::AppResult;

pub trait ThemesQueryUseCase: Send + Sync {
    /// Sorted identifiers of every selectable theme.
    fn list_themes(&self) -> AppResult<Vec<String>>;
}
