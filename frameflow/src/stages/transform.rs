//! Style application stage.

use std::time::Duration;
use tracing::debug;

use crate::cancellation::CancellationToken;
use crate::core::{FrameItem, ReadyFrame};
use crate::errors::FrameflowError;
use crate::stages::FrameStyler;

/// Applies a ready frame's target styling after a fixed settle delay.
///
/// Pure with respect to scheduling: no branching, no retries. Failures are
/// handled at the item-pipeline boundary, not here.
#[derive(Debug, Clone, Copy)]
pub struct StyleStage {
    latency: Duration,
}

impl StyleStage {
    /// Creates a stage with the given settle latency.
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// Applies the target size and border emphasis, echoing the item.
    ///
    /// Unwinds with `FrameflowError::Cancelled` and no side effect if the
    /// token fires during the settle delay.
    pub async fn apply(
        &self,
        ready: ReadyFrame,
        styler: &dyn FrameStyler,
        token: &CancellationToken,
    ) -> Result<FrameItem, FrameflowError> {
        tokio::time::sleep(self.latency).await;
        if token.is_cancelled() {
            return Err(FrameflowError::Cancelled(
                token.reason().unwrap_or_default(),
            ));
        }

        let ReadyFrame { item, .. } = ready;
        styler.apply_target(&item.id, &item.target)?;
        debug!(frame = %item.id, target = %item.target, "style applied");
        Ok(item)
    }
}
