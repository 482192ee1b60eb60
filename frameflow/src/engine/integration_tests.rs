//! End-to-end tests for the engine and its dispatch strategies.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

use crate::core::{LogEntry, LogStatus, STEP_FETCH, STEP_FINAL, STEP_PROBE, STEP_STYLE};
use crate::engine::{DispatchStrategy, EngineConfig, PipelineEngine, RunOutcome};
use crate::errors::FrameflowError;
use crate::events::CollectingEventSink;
use crate::stages::PollPolicy;
use crate::testing::{
    sample_frames, FailingItemSource, RecordingStyler, ScriptedProbe, StaticItemSource,
};

fn fast_config() -> EngineConfig {
    EngineConfig::new()
        .with_style_latency_ms(2)
        .with_poll(PollPolicy::new().with_interval_ms(2))
}

fn engine_with(
    probe: Arc<ScriptedProbe>,
    styler: Arc<RecordingStyler>,
    sink: Arc<CollectingEventSink>,
) -> PipelineEngine {
    let source = Arc::new(StaticItemSource::new(
        sample_frames(),
        Duration::from_millis(5),
    ));
    PipelineEngine::new(source, probe, styler)
        .with_sink(sink)
        .with_config(fast_config())
}

fn log_index(log: &[LogEntry], step: u32, status: LogStatus, needle: &str) -> usize {
    log.iter()
        .position(|e| e.step == step && e.status == status && e.message.contains(needle))
        .unwrap_or_else(|| panic!("no entry: step {step} {status} containing {needle:?}"))
}

fn finish_count(log: &[LogEntry]) -> usize {
    log.iter()
        .filter(|e| e.step == STEP_FINAL && e.label == "finish" && e.status == LogStatus::Done)
        .count()
}

#[tokio::test]
async fn sequential_settles_each_item_before_the_next_starts() {
    let probe = Arc::new(ScriptedProbe::new(2));
    let styler = Arc::new(RecordingStyler::new());
    let engine = engine_with(probe, styler.clone(), Arc::new(CollectingEventSink::new()));

    let outcome = engine.run(DispatchStrategy::Sequential).await;
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            styled: 3,
            failed: 0,
            cancelled: 0
        }
    );

    // Styling happened strictly in item order.
    assert_eq!(
        styler.applied_ids(),
        vec!["chart-sales", "chart-inventory", "chart-users"]
    );

    // The style stage of item k settles before item k+1 starts probing.
    let log = engine.state_snapshot().log;
    let titles = ["Sales chart", "Inventory chart", "User trend"];
    for pair in titles.windows(2) {
        let done = log_index(&log, STEP_STYLE, LogStatus::Done, pair[0]);
        let next_start = log_index(&log, STEP_PROBE, LogStatus::Running, pair[1]);
        assert!(
            done < next_start,
            "{} settled at {done}, but {} started probing at {next_start}",
            pair[0],
            pair[1]
        );
    }
}

#[tokio::test]
async fn parallel_brings_every_item_to_a_terminal_entry() {
    let probe = Arc::new(ScriptedProbe::ready_immediately());
    probe.set_ready_after("chart-sales", 4);
    probe.set_ready_after("chart-users", 2);
    let styler = Arc::new(RecordingStyler::new());
    let engine = engine_with(probe, styler.clone(), Arc::new(CollectingEventSink::new()));

    let outcome = engine.run(DispatchStrategy::Parallel).await;
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            styled: 3,
            failed: 0,
            cancelled: 0
        }
    );

    let mut styled = styler.applied_ids();
    styled.sort();
    assert_eq!(styled, vec!["chart-inventory", "chart-sales", "chart-users"]);

    // No item is silently dropped from the log.
    let log = engine.state_snapshot().log;
    for title in ["Sales chart", "Inventory chart", "User trend"] {
        log_index(&log, STEP_STYLE, LogStatus::Done, title);
    }
}

#[tokio::test]
async fn latest_wins_lets_only_the_final_item_complete() {
    let probe = Arc::new(ScriptedProbe::new(2));
    let styler = Arc::new(RecordingStyler::new());
    let engine = engine_with(probe, styler.clone(), Arc::new(CollectingEventSink::new()));

    let outcome = engine.run(DispatchStrategy::LatestWins).await;
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            styled: 1,
            failed: 0,
            cancelled: 2
        }
    );

    assert_eq!(styler.applied_ids(), vec!["chart-users"]);

    let log = engine.state_snapshot().log;
    log_index(&log, STEP_STYLE, LogStatus::Done, "User trend");
    for title in ["Sales chart", "Inventory chart"] {
        assert!(
            !log
                .iter()
                .any(|e| e.step == STEP_STYLE && e.status == LogStatus::Done
                    && e.message.contains(title)),
            "pre-empted item {title} must not finish its style stage"
        );
    }
}

#[tokio::test]
async fn latest_wins_with_a_single_item_runs_it_to_completion() {
    let source = Arc::new(StaticItemSource::new(
        vec![sample_frames().remove(0)],
        Duration::from_millis(2),
    ));
    let styler = Arc::new(RecordingStyler::new());
    let engine = PipelineEngine::new(
        source,
        Arc::new(ScriptedProbe::ready_immediately()),
        styler.clone(),
    )
    .with_config(fast_config());

    let outcome = engine.run(DispatchStrategy::LatestWins).await;
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            styled: 1,
            failed: 0,
            cancelled: 0
        }
    );
    assert_eq!(styler.applied_ids(), vec!["chart-sales"]);
}

#[tokio::test]
async fn one_unavailable_item_does_not_block_its_siblings() {
    let probe = Arc::new(ScriptedProbe::ready_immediately());
    probe.never_ready("chart-inventory");
    let styler = Arc::new(RecordingStyler::new());
    let source = Arc::new(StaticItemSource::new(
        sample_frames(),
        Duration::from_millis(5),
    ));
    let engine = PipelineEngine::new(source, probe, styler.clone()).with_config(
        EngineConfig::new()
            .with_style_latency_ms(2)
            .with_poll(PollPolicy::new().with_interval_ms(1).with_max_attempts(5)),
    );

    let outcome = engine.run(DispatchStrategy::Parallel).await;
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            styled: 2,
            failed: 1,
            cancelled: 0
        }
    );

    let mut styled = styler.applied_ids();
    styled.sort();
    assert_eq!(styled, vec!["chart-sales", "chart-users"]);

    let log = engine.state_snapshot().log;
    log_index(&log, STEP_FINAL, LogStatus::Error, "Inventory chart");
}

#[tokio::test]
async fn styler_failure_is_logged_and_isolated() {
    let probe = Arc::new(ScriptedProbe::ready_immediately());
    let styler = Arc::new(RecordingStyler::new());
    styler.fail_for("chart-sales");
    let engine = engine_with(probe, styler.clone(), Arc::new(CollectingEventSink::new()));

    let outcome = engine.run(DispatchStrategy::Sequential).await;
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            styled: 2,
            failed: 1,
            cancelled: 0
        }
    );

    let log = engine.state_snapshot().log;
    log_index(&log, STEP_FINAL, LogStatus::Error, "Sales chart");
    assert_eq!(finish_count(&log), 1);
}

#[tokio::test]
async fn every_run_finalizes_exactly_once() {
    let sink = Arc::new(CollectingEventSink::new());
    let probe = Arc::new(ScriptedProbe::ready_immediately());
    let styler = Arc::new(RecordingStyler::new());
    let engine = engine_with(probe, styler, sink.clone());

    engine.run(DispatchStrategy::Sequential).await;
    let log = engine.state_snapshot().log;
    assert_eq!(finish_count(&log), 1);
    assert!(!engine.is_running());
    assert_eq!(sink.count_of("run.finished"), 1);

    // A second run resets the log and closes it again with one terminal entry.
    engine.run(DispatchStrategy::Parallel).await;
    let log = engine.state_snapshot().log;
    assert_eq!(finish_count(&log), 1);
    assert_eq!(sink.count_of("run.finished"), 2);
}

#[tokio::test]
async fn cancelled_run_still_finalizes() {
    let sink = Arc::new(CollectingEventSink::new());
    let probe = Arc::new(ScriptedProbe::new(usize::MAX));
    let styler = Arc::new(RecordingStyler::new());
    let engine = Arc::new(engine_with(probe, styler.clone(), sink.clone()));

    let handle = tokio::spawn({
        let engine = engine.clone();
        async move { engine.run(DispatchStrategy::Parallel).await }
    });

    tokio::time::sleep(Duration::from_millis(25)).await;
    engine.cancel("component disposed");

    let outcome = handle.await.unwrap();
    assert_eq!(outcome, RunOutcome::Cancelled);
    assert!(!engine.is_running());
    assert!(styler.applied().is_empty());

    let log = engine.state_snapshot().log;
    assert_eq!(finish_count(&log), 1);
    assert_eq!(sink.count_of("run.finished"), 1);
}

#[tokio::test]
async fn fetch_failure_aborts_the_run_but_finalizes() {
    let engine = PipelineEngine::new(
        Arc::new(FailingItemSource::new("backend unreachable")),
        Arc::new(ScriptedProbe::ready_immediately()),
        Arc::new(RecordingStyler::new()),
    )
    .with_config(fast_config());

    let outcome = engine.run(DispatchStrategy::Sequential).await;
    assert_eq!(
        outcome,
        RunOutcome::Aborted("item source error: backend unreachable".to_string())
    );

    let log = engine.state_snapshot().log;
    log_index(&log, STEP_FETCH, LogStatus::Error, "backend unreachable");
    assert_eq!(finish_count(&log), 1);
    assert!(!engine.is_running());
}

#[tokio::test]
async fn a_new_run_supersedes_an_active_one() {
    let probe = Arc::new(ScriptedProbe::new(usize::MAX));
    let styler = Arc::new(RecordingStyler::new());
    let engine = Arc::new(engine_with(probe.clone(), styler, Arc::new(CollectingEventSink::new())));

    let first = tokio::spawn({
        let engine = engine.clone();
        async move { engine.run(DispatchStrategy::Sequential).await }
    });
    tokio::time::sleep(Duration::from_millis(15)).await;

    // Unblock the probes, then start the superseding run.
    for item in sample_frames() {
        probe.set_ready_after(item.id, 1);
    }
    let second = engine.run(DispatchStrategy::Sequential).await;
    assert_eq!(
        second,
        RunOutcome::Completed {
            styled: 3,
            failed: 0,
            cancelled: 0
        }
    );

    assert_eq!(first.await.unwrap(), RunOutcome::Cancelled);

    // The surviving log belongs to the second run and is well-formed.
    let log = engine.state_snapshot().log;
    log_index(&log, STEP_FETCH, LogStatus::Done, "3 frames fetched");
    assert_eq!(finish_count(&log), 1);
    assert!(!engine.is_running());
}

#[tokio::test]
async fn reset_clears_state_and_is_idempotent() {
    let engine = engine_with(
        Arc::new(ScriptedProbe::ready_immediately()),
        Arc::new(RecordingStyler::new()),
        Arc::new(CollectingEventSink::new()),
    );

    engine.run(DispatchStrategy::Sequential).await;
    assert!(!engine.state_snapshot().log.is_empty());

    engine.reset().unwrap();
    let snapshot = engine.state_snapshot();
    assert!(snapshot.log.is_empty());
    assert!(snapshot.items.is_empty());

    // Idempotent on an already-clean engine.
    engine.reset().unwrap();
    assert!(engine.state_snapshot().log.is_empty());
}

#[tokio::test]
async fn reset_is_rejected_while_running() {
    let probe = Arc::new(ScriptedProbe::new(usize::MAX));
    let engine = Arc::new(engine_with(
        probe,
        Arc::new(RecordingStyler::new()),
        Arc::new(CollectingEventSink::new()),
    ));

    let handle = tokio::spawn({
        let engine = engine.clone();
        async move { engine.run(DispatchStrategy::Parallel).await }
    });
    tokio::time::sleep(Duration::from_millis(15)).await;

    assert!(matches!(
        engine.reset(),
        Err(FrameflowError::RunInProgress)
    ));

    engine.cancel("test over");
    handle.await.unwrap();
    assert!(engine.reset().is_ok());
}
