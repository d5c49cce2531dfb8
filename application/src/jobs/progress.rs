use std::sync::Arc;

use domain::job::{JobId, StatusUpdate};

use crate::jobs::registry::JobRegistry;
use crate::ports::outgoing::progress::ProgressSink;

/// Routes progress of one job into the shared registry.
#[derive(Debug, Clone)]
pub struct JobProgressSink {
    registry: Arc<JobRegistry>,
    job_id: JobId,
}

impl JobProgressSink {
    #[must_use]
    pub fn new(registry: Arc<JobRegistry>, job_id: JobId) -> Self {
        Self { registry, job_id }
    }
}

impl ProgressSink for JobProgressSink {
    fn report(&self, update: StatusUpdate) {
        self.registry.update(self.job_id, update);
    }

    fn is_cancelled(&self) -> bool {
        self.registry.is_cancelled(self.job_id)
    }
}
