use async_trait::async_trait;
use std::time::Duration;
use tokio::time;

use cityposter_application::ports::outgoing::sleeper::SleeperPort;

#[derive(Default)]
pub struct TokioSleeper;

#[async_trait]
impl SleeperPort for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            time::sleep(duration).await;
        }
    }
}
