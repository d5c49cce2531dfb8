pub mod blocking_render;
pub mod sleeper;

use tracing::{Instrument, info_span};

use cityposter_application::ports::outgoing::task_spawn::{JobFuture, TaskSpawnPort};
use domain::job::JobId;

pub struct TokioTaskSpawnAdapter;

impl TokioTaskSpawnAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TokioTaskSpawnAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskSpawnPort for TokioTaskSpawnAdapter {
    fn spawn_job(&self, job_id: JobId, future: JobFuture) {
        tokio::spawn(future.instrument(info_span!("poster_job", %job_id)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn spawned_job_runs_detached() {
        let (tx, rx) = oneshot::channel();

        TokioTaskSpawnAdapter::new().spawn_job(
            JobId::new(),
            Box::pin(async move {
                tx.send(42).expect("receiver alive");
            }),
        );

        assert_eq!(rx.await.expect("job ran"), 42);
    }
}
