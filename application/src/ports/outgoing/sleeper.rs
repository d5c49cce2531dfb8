use std::sync::Arc;
use std::time::Duration;

/// Politeness delay between provider calls.
#[async_trait::async_trait]
pub trait SleeperPort: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub type DynSleeperPort = Arc<dyn SleeperPort>;
