//! Dispatch strategies: how the per-item pipeline is scheduled across items.
//!
//! All variants reuse the same per-item pipeline; only the scheduling
//! discipline differs, so adding a strategy never touches stage logic.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::cancellation::CancellationToken;
use crate::core::FrameItem;
use crate::engine::item_pipeline::{run_item, ItemOutcome, RunContext};

/// Scheduling discipline applied across the item collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStrategy {
    /// Item i+1 does not start until item i fully settles.
    #[default]
    Sequential,
    /// All items concurrently pending; no inter-item ordering.
    Parallel,
    /// Starting item i+1 cancels item i; only the last item is immune.
    LatestWins,
}

impl fmt::Display for DispatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Parallel => write!(f, "parallel"),
            Self::LatestWins => write!(f, "latest_wins"),
        }
    }
}

/// Applies the per-item pipeline across `items` under `strategy`.
///
/// Outcomes are returned in item order regardless of completion order.
pub(crate) async fn dispatch(
    strategy: DispatchStrategy,
    items: Vec<FrameItem>,
    ctx: Arc<RunContext>,
    token: Arc<CancellationToken>,
) -> Vec<ItemOutcome> {
    debug!(%strategy, count = items.len(), "dispatching items");
    match strategy {
        DispatchStrategy::Sequential => {
            let mut outcomes = Vec::with_capacity(items.len());
            for item in items {
                // A cancelled run stops before the next item starts.
                if token.is_cancelled() {
                    outcomes.push(ItemOutcome::Cancelled);
                    continue;
                }
                outcomes.push(run_item(ctx.clone(), item, token.clone()).await);
            }
            outcomes
        }
        DispatchStrategy::Parallel => {
            let pending: Vec<_> = items
                .into_iter()
                .map(|item| run_item(ctx.clone(), item, token.clone()))
                .collect();
            join_all(pending).await
        }
        DispatchStrategy::LatestWins => {
            let mut handles = Vec::with_capacity(items.len());
            let mut live: Option<Arc<CancellationToken>> = None;
            for item in items {
                // Starting this item unconditionally tears down the previous one.
                if let Some(prev) = live.take() {
                    prev.cancel("superseded by a later item");
                }
                let child = token.child();
                live = Some(child.clone());
                handles.push(tokio::spawn(run_item(ctx.clone(), item, child)));
            }

            let mut outcomes = Vec::with_capacity(handles.len());
            for handle in handles {
                outcomes.push(handle.await.unwrap_or(ItemOutcome::Cancelled));
            }
            outcomes
        }
    }
}
