use domain::job::{JobId, JobSnapshot, PosterArtifact};

use crate::error::AppResult;
use crate::posters::request::PosterRequest;

pub trait PosterJobsUseCase: Send + Sync {
    /// Registers the job and runs it in the background.
    fn submit_job(&self, request: PosterRequest) -> AppResult<JobId>;

    fn job_status(&self, job_id: JobId) -> AppResult<JobSnapshot>;

    fn cancel_job(&self, job_id: JobId) -> AppResult<()>;

    fn job_count(&self) -> usize;
}

/// Every file of a completed job and the name offered for their archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterBundle {
    pub archive_name: String,
    pub artifacts: Vec<PosterArtifact>,
}

pub trait PosterArtifactsUseCase: Send + Sync {
    /// Artifact of a completed job; out of range indices are clamped.
    fn artifact(&self, job_id: JobId, index: i64) -> AppResult<PosterArtifact>;

    fn artifact_bundle(&self, job_id: JobId) -> AppResult<PosterBundle>;
}
