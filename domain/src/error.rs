use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid color format: {0}")]
    InvalidColorFormat(String),

    #[error("Invalid canvas: {0}")]
    InvalidCanvas(String),

    #[error("Invalid theme: {0}")]
    InvalidTheme(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
