use std::sync::Arc;

use domain::job::StatusUpdate;

/// Per-job progress channel shared by the fetch coordinator and the renderer.
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: StatusUpdate);

    /// Cooperative cancellation flag. Checked between steps, never preemptive.
    fn is_cancelled(&self) -> bool;
}

pub type DynProgressSink = Arc<dyn ProgressSink>;
