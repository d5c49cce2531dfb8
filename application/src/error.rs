use std::io;
use thiserror::Error;

use domain::dataset::DatasetKind;
use domain::error::DomainError;
use domain::job::JobFailureKind;

use crate::ports::outgoing::dataset_cache::CacheError;
use crate::ports::outgoing::geo_provider::ProviderError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Could not obtain {dataset} data: {reason}")]
    DataUnavailable { dataset: DatasetKind, reason: String },

    #[error("Cancelled by user")]
    Cancelled,

    #[error("Provider failure: {0}")]
    ProviderFailure(#[from] ProviderError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Theme not found: {name}")]
    ThemeNotFound { name: String },

    #[error("Render error: {message}")]
    RenderError { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Task error: {message}")]
    TaskError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Internal server error")]
    InternalServerError,
}

impl AppError {
    /// Classification recorded on a failed job.
    #[must_use]
    pub fn failure_kind(&self) -> JobFailureKind {
        match self {
            Self::Domain(_) | Self::InvalidInput { .. } | Self::ThemeNotFound { .. } => {
                JobFailureKind::InvalidInput
            }
            Self::DataUnavailable { .. } | Self::NotFound { .. } => {
                JobFailureKind::DataUnavailable
            }
            Self::Cancelled => JobFailureKind::Cancelled,
            Self::ProviderFailure(_) => JobFailureKind::ProviderFailure,
            Self::RenderError { .. } => JobFailureKind::RenderFailure,
            Self::Cache(_)
            | Self::IoError(_)
            | Self::JsonError(_)
            | Self::TaskError { .. }
            | Self::ConfigError { .. }
            | Self::InternalServerError => JobFailureKind::Internal,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
