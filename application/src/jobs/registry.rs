use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use time::OffsetDateTime;
use tracing::debug;

use domain::job::{JobId, JobSnapshot, JobStatus, Phase, PosterArtifact, StatusUpdate};

/// In-process store of every job's status. All writes go through
/// [`JobRegistry::update`] or [`JobRegistry::cancel`]; readers get copies.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<JobId, JobStatus>>,
}

impl JobRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, JobStatus>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create(&self, job_id: JobId, message: impl Into<String>) {
        let status = JobStatus::new(job_id, message, OffsetDateTime::now_utc());
        self.lock().insert(job_id, status);
        debug!("Registered job {}", job_id);
    }

    /// Merges `update` into the job record. Returns `false` for unknown jobs.
    pub fn update(&self, job_id: JobId, update: StatusUpdate) -> bool {
        let mut jobs = self.lock();
        match jobs.get_mut(&job_id) {
            Some(status) => {
                status.apply(update, OffsetDateTime::now_utc());
                true
            }
            None => false,
        }
    }

    /// Sets the cancelled flag. The record itself is kept.
    pub fn cancel(&self, job_id: JobId) -> bool {
        let mut jobs = self.lock();
        match jobs.get_mut(&job_id) {
            Some(status) => {
                status.cancelled = true;
                status.updated_at = OffsetDateTime::now_utc();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_cancelled(&self, job_id: JobId) -> bool {
        self.lock().get(&job_id).is_some_and(|status| status.cancelled)
    }

    #[must_use]
    pub fn snapshot(&self, job_id: JobId) -> Option<JobSnapshot> {
        let now = OffsetDateTime::now_utc();
        self.lock().get(&job_id).map(|status| status.snapshot(now))
    }

    /// Artifacts of a completed job; `None` while running, failed or unknown.
    #[must_use]
    pub fn completed_artifacts(&self, job_id: JobId) -> Option<Vec<PosterArtifact>> {
        let jobs = self.lock();
        let status = jobs.get(&job_id)?;
        (status.phase == Phase::Completed).then(|| status.artifacts().to_vec())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
