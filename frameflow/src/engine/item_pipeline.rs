//! Per-item stage pipeline with isolated failure handling.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

use crate::cancellation::CancellationToken;
use crate::core::{FrameItem, LogEntry, STEP_FINAL, STEP_PROBE, STEP_STYLE};
use crate::engine::state::RunState;
use crate::engine::EngineConfig;
use crate::errors::FrameflowError;
use crate::events::EventSink;
use crate::stages::{FrameStyler, PollingWaiter, ReadinessProbe, StyleStage};

/// Shared context handed to per-item stage work for the duration of a run.
pub(crate) struct RunContext {
    pub state: Arc<RwLock<RunState>>,
    pub sink: Arc<dyn EventSink>,
    pub probe: Arc<dyn ReadinessProbe>,
    pub styler: Arc<dyn FrameStyler>,
    pub config: EngineConfig,
}

impl RunContext {
    /// Appends a log entry and forwards it to the sink.
    pub fn log(&self, entry: LogEntry) {
        self.sink
            .emit("log.appended", serde_json::to_value(&entry).ok());
        self.state.write().log.push(entry);
    }
}

/// Terminal state of one item's pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Both stages completed; the item was styled.
    Styled(FrameItem),
    /// A stage failed; the error was logged and suppressed.
    Failed,
    /// The item was torn down before completing.
    Cancelled,
}

/// Runs probe then style for exactly one item.
///
/// Failures never propagate to siblings or the run: they become an `Error`
/// log entry and `ItemOutcome::Failed`. A cancelled item stops emitting log
/// entries the moment its token fires.
pub(crate) async fn run_item(
    ctx: Arc<RunContext>,
    item: FrameItem,
    token: Arc<CancellationToken>,
) -> ItemOutcome {
    if token.is_cancelled() {
        return ItemOutcome::Cancelled;
    }

    ctx.log(LogEntry::running(
        STEP_PROBE,
        "probe",
        format!("[{}] waiting for frame element", item.title),
    ));

    let waiter = PollingWaiter::new(ctx.config.poll);
    let ready = match waiter.wait(&item, ctx.probe.as_ref(), &token).await {
        Ok(ready) => ready,
        Err(err) if err.is_cancelled() => return ItemOutcome::Cancelled,
        Err(err) => return fail(&ctx, &item, &err),
    };

    ctx.log(LogEntry::done(
        STEP_PROBE,
        "probe",
        format!("[{}] frame element confirmed", item.title),
    ));
    ctx.sink.emit(
        "frame.ready",
        Some(serde_json::json!({ "frame": item.id, "attempts": ready.attempts })),
    );

    ctx.log(LogEntry::running(
        STEP_STYLE,
        "style",
        format!("[{}] applying {}", item.title, item.target),
    ));

    let stage = StyleStage::new(ctx.config.style_latency());
    match stage.apply(ready, ctx.styler.as_ref(), &token).await {
        Ok(item) => {
            ctx.log(LogEntry::done(
                STEP_STYLE,
                "style",
                format!("[{}] style applied", item.title),
            ));
            ctx.sink
                .emit("style.applied", Some(serde_json::json!({ "frame": item.id })));
            ItemOutcome::Styled(item)
        }
        Err(err) if err.is_cancelled() => ItemOutcome::Cancelled,
        Err(err) => fail(&ctx, &item, &err),
    }
}

fn fail(ctx: &RunContext, item: &FrameItem, err: &FrameflowError) -> ItemOutcome {
    debug!(frame = %item.id, error = %err, "item pipeline failed");
    ctx.log(LogEntry::error(
        STEP_FINAL,
        "error",
        format!("[{}] {err}", item.title),
    ));
    ctx.sink.emit(
        "item.failed",
        Some(serde_json::json!({ "frame": item.id, "error": err.to_string() })),
    );
    ItemOutcome::Failed
}
