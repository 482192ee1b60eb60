//! Pipeline engine: orchestrates fetch, dispatch, and finalization.

mod dispatch;
mod item_pipeline;
mod state;

#[cfg(test)]
mod integration_tests;

pub use dispatch::DispatchStrategy;
pub use item_pipeline::ItemOutcome;
pub use state::RunState;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cancellation::CancellationToken;
use crate::core::{LogEntry, STEP_FETCH, STEP_FINAL};
use crate::errors::FrameflowError;
use crate::events::{EventSink, NoOpEventSink};
use crate::stages::{FrameStyler, ItemSource, PollPolicy, ReadinessProbe};

use item_pipeline::RunContext;

/// Engine tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Readiness polling cadence and bound.
    pub poll: PollPolicy,
    /// Settle delay before the style stage mutates a frame, in milliseconds.
    pub style_latency_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll: PollPolicy::default(),
            style_latency_ms: 600,
        }
    }
}

impl EngineConfig {
    /// Creates the default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the poll policy.
    #[must_use]
    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Sets the style settle latency.
    #[must_use]
    pub fn with_style_latency_ms(mut self, style_latency_ms: u64) -> Self {
        self.style_latency_ms = style_latency_ms;
        self
    }

    pub(crate) fn style_latency(&self) -> Duration {
        Duration::from_millis(self.style_latency_ms)
    }
}

/// Terminal result of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every item was dispatched; per-item tallies attached.
    Completed {
        /// Items styled successfully.
        styled: usize,
        /// Items whose failure was suppressed.
        failed: usize,
        /// Items torn down before completing.
        cancelled: usize,
    },
    /// The run was cancelled or superseded mid-flight.
    Cancelled,
    /// The item-list fetch failed; nothing was dispatched.
    Aborted(String),
}

/// Top-level orchestrator.
///
/// Owns the run state and guarantees that every run, on every exit path,
/// closes its log with exactly one terminal entry and clears the running
/// flag.
pub struct PipelineEngine {
    state: Arc<RwLock<RunState>>,
    token: RwLock<Arc<CancellationToken>>,
    source: Arc<dyn ItemSource>,
    probe: Arc<dyn ReadinessProbe>,
    styler: Arc<dyn FrameStyler>,
    sink: Arc<dyn EventSink>,
    config: EngineConfig,
}

impl PipelineEngine {
    /// Creates an engine over the given collaborators.
    #[must_use]
    pub fn new(
        source: Arc<dyn ItemSource>,
        probe: Arc<dyn ReadinessProbe>,
        styler: Arc<dyn FrameStyler>,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(RunState::default())),
            token: RwLock::new(CancellationToken::new()),
            source,
            probe,
            styler,
            sink: Arc::new(NoOpEventSink),
            config: EngineConfig::default(),
        }
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces the config.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns a snapshot of the run state.
    #[must_use]
    pub fn state_snapshot(&self) -> RunState {
        self.state.read().clone()
    }

    /// Returns whether a run is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.read().running
    }

    /// Cancels the active run, if any.
    ///
    /// Propagates to the active strategy and every outstanding poller; the
    /// run still finalizes its log before settling.
    pub fn cancel(&self, reason: impl Into<String>) {
        self.token.read().cancel(reason);
    }

    /// Clears the log and the item collection.
    ///
    /// Rejected while a run is active.
    pub fn reset(&self) -> Result<(), FrameflowError> {
        let mut state = self.state.write();
        if state.running {
            return Err(FrameflowError::RunInProgress);
        }
        state.clear();
        Ok(())
    }

    /// Runs the pipeline under `strategy`.
    ///
    /// An already-active run is cancelled and superseded. However the run
    /// ends, its log closes with exactly one terminal entry and the running
    /// flag returns to false.
    pub async fn run(&self, strategy: DispatchStrategy) -> RunOutcome {
        let (run_id, token) = self.begin_run(strategy);
        let outcome = self.run_inner(strategy, &token).await;
        self.finish_run(run_id, &outcome);
        outcome
    }

    fn begin_run(&self, strategy: DispatchStrategy) -> (Uuid, Arc<CancellationToken>) {
        // Supersede any active run before touching shared state.
        let fresh = CancellationToken::new();
        let prev = std::mem::replace(&mut *self.token.write(), fresh.clone());
        if self.is_running() && !prev.is_cancelled() {
            warn!("superseding an active run");
            prev.cancel("superseded by a new run");
        }

        let run_id = Uuid::new_v4();
        {
            let mut state = self.state.write();
            state.clear();
            state.run_id = Some(run_id);
            state.running = true;
        }
        self.sink.emit(
            "run.started",
            Some(serde_json::json!({
                "run_id": run_id.to_string(),
                "strategy": strategy.to_string(),
            })),
        );
        (run_id, fresh)
    }

    async fn run_inner(
        &self,
        strategy: DispatchStrategy,
        token: &Arc<CancellationToken>,
    ) -> RunOutcome {
        let ctx = Arc::new(RunContext {
            state: self.state.clone(),
            sink: self.sink.clone(),
            probe: self.probe.clone(),
            styler: self.styler.clone(),
            config: self.config,
        });

        ctx.log(LogEntry::running(STEP_FETCH, "fetch", "fetching frame list"));
        let items = match self.source.fetch_items().await {
            Ok(items) => items,
            Err(err) => {
                ctx.log(LogEntry::error(
                    STEP_FETCH,
                    "fetch",
                    format!("frame list fetch failed: {err}"),
                ));
                return RunOutcome::Aborted(err.to_string());
            }
        };
        if token.is_cancelled() {
            return RunOutcome::Cancelled;
        }
        ctx.log(LogEntry::done(
            STEP_FETCH,
            "fetch",
            format!("{} frames fetched", items.len()),
        ));
        self.state.write().items = items.clone();

        let outcomes = dispatch::dispatch(strategy, items, ctx, token.clone()).await;
        if token.is_cancelled() {
            return RunOutcome::Cancelled;
        }

        let styled = outcomes
            .iter()
            .filter(|o| matches!(o, ItemOutcome::Styled(_)))
            .count();
        let failed = outcomes
            .iter()
            .filter(|o| matches!(o, ItemOutcome::Failed))
            .count();
        let cancelled = outcomes
            .iter()
            .filter(|o| matches!(o, ItemOutcome::Cancelled))
            .count();
        RunOutcome::Completed {
            styled,
            failed,
            cancelled,
        }
    }

    fn finish_run(&self, run_id: Uuid, outcome: &RunOutcome) {
        let mut state = self.state.write();
        if state.run_id != Some(run_id) {
            // A superseding run owns the state now; this run's log is gone.
            debug!(run = %run_id, "skipping finalization of a superseded run");
            return;
        }
        state
            .log
            .push(LogEntry::done(STEP_FINAL, "finish", "pipeline run finished"));
        state.running = false;
        drop(state);

        self.sink.emit(
            "run.finished",
            Some(serde_json::json!({
                "run_id": run_id.to_string(),
                "outcome": format!("{outcome:?}"),
            })),
        );
    }
}
