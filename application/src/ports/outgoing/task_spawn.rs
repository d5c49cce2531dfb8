use futures::future::BoxFuture;
use std::sync::Arc;

use domain::job::JobId;

pub type JobFuture = BoxFuture<'static, ()>;

pub trait TaskSpawnPort: Send + Sync {
    /// Runs a poster job detached from the request that submitted it.
    fn spawn_job(&self, job_id: JobId, future: JobFuture);
}

pub type DynTaskSpawnPort = Arc<dyn TaskSpawnPort>;
