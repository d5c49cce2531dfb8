use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

use domain::dataset::{DatasetBundle, DatasetKind, FeatureCollection};
use domain::fetch_spec::FetchSpec;
use domain::job::{Phase, StatusUpdate};
use domain::tags::TagFilter;

use crate::error::{AppError, AppResult};
use crate::fetch::gateway::GeoDataGateway;
use crate::ports::outgoing::geo_provider::ProviderError;
use crate::ports::outgoing::progress::ProgressSink;

const STEP_STARTED: u8 = 10;
const STEP_DONE: u8 = 100;
const STREETS_MISSING: &str = "Failed to fetch street network data";

/// Runs the street, water and park fetchers concurrently for one area and
/// joins them into a [`DatasetBundle`].
#[derive(Clone)]
pub struct ParallelFetchCoordinator {
    gateway: Arc<GeoDataGateway>,
}

impl ParallelFetchCoordinator {
    #[must_use]
    pub fn new(gateway: Arc<GeoDataGateway>) -> Self {
        Self { gateway }
    }

    #[must_use]
    pub fn gateway(&self) -> &Arc<GeoDataGateway> {
        &self.gateway
    }

    /// Every fetcher reports its start, then bails out without touching the
    /// network if the job was cancelled. Completion is reported only after all
    /// three have resolved. Streets are mandatory; water and park failures are
    /// logged and dropped.
    #[instrument(skip(self, progress), fields(area = %spec))]
    pub async fn fetch_all(
        &self,
        spec: &FetchSpec,
        progress: &dyn ProgressSink,
    ) -> AppResult<DatasetBundle> {
        let permits = Semaphore::new(self.gateway.settings().max_concurrent_fetches.max(1));
        let water_filter = TagFilter::water();
        let parks_filter = TagFilter::parks();

        let streets = guarded(
            DatasetKind::Streets,
            "Downloading street network...",
            &permits,
            progress,
            self.gateway.fetch_streets(spec, progress),
        );
        let water = guarded(
            DatasetKind::Water,
            "Downloading water features...",
            &permits,
            progress,
            self.gateway
                .fetch_features(DatasetKind::Water, spec, &water_filter, progress),
        );
        let parks = guarded(
            DatasetKind::Parks,
            "Downloading parks and green spaces...",
            &permits,
            progress,
            self.gateway
                .fetch_features(DatasetKind::Parks, spec, &parks_filter, progress),
        );

        let (streets, water, parks) = tokio::join!(streets, water, parks);

        let mut done = StatusUpdate::phase(Phase::FetchingData, "All map data fetched");
        for kind in DatasetKind::ALL {
            done = done.with_fetch_step(kind, STEP_DONE);
        }
        progress.report(done);

        if progress.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        let streets = match streets {
            Some(Ok(Some(graph))) => graph,
            Some(Ok(None)) | None => {
                return Err(AppError::DataUnavailable {
                    dataset: DatasetKind::Streets,
                    reason: STREETS_MISSING.to_string(),
                });
            }
            Some(Err(e)) => {
                warn!(error = %e, "Street network fetch failed");
                return Err(AppError::DataUnavailable {
                    dataset: DatasetKind::Streets,
                    reason: format!("{STREETS_MISSING}: {e}"),
                });
            }
        };

        Ok(DatasetBundle {
            streets,
            water: optional(DatasetKind::Water, water),
            parks: optional(DatasetKind::Parks, parks),
        })
    }
}

/// One fetcher body. `None` means the job was cancelled before the provider
/// was contacted.
async fn guarded<T, F>(
    kind: DatasetKind,
    message: &str,
    permits: &Semaphore,
    progress: &dyn ProgressSink,
    fetch: F,
) -> Option<Result<Option<T>, ProviderError>>
where
    F: Future<Output = Result<Option<T>, ProviderError>>,
{
    let _permit = permits.acquire().await.ok();
    progress.report(
        StatusUpdate::phase(Phase::fetching(kind), message).with_fetch_step(kind, STEP_STARTED),
    );
    if progress.is_cancelled() {
        debug!("Skipping {} fetch, job cancelled", kind);
        return None;
    }
    Some(fetch.await)
}

fn optional(
    kind: DatasetKind,
    result: Option<Result<Option<Arc<FeatureCollection>>, ProviderError>>,
) -> Option<Arc<FeatureCollection>> {
    match result {
        Some(Ok(features)) => features,
        Some(Err(e)) => {
            warn!(error = %e, "Failed to fetch {}, continuing without it", kind);
            None
        }
        None => None,
    }
}
