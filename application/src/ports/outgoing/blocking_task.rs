use futures::future::BoxFuture;
use std::sync::Arc;

use crate::error::AppResult;
use crate::ports::outgoing::progress::DynProgressSink;
use crate::ports::outgoing::renderer::RenderRequest;

pub type RenderFuture = BoxFuture<'static, AppResult<()>>;

/// Moves a render off the async executor.
pub trait BlockingRenderPort: Send + Sync {
    fn render_blocking(&self, request: RenderRequest, progress: DynProgressSink) -> RenderFuture;
}

pub type DynBlockingRenderPort = Arc<dyn BlockingRenderPort>;
