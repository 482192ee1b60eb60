//! Runs the three dispatch strategies over mock frames, prints each run's
//! log, then demonstrates the cache-aware configuration loader.
//!
//! ```sh
//! cargo run --example frame_pipeline
//! ```

use std::sync::Arc;
use std::time::Duration;

use frameflow::prelude::*;
use frameflow::testing::{
    sample_filter_fields, sample_frames, CountingFetcher, RecordingStyler, ScriptedProbe,
    StaticItemSource,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    for strategy in [
        DispatchStrategy::Sequential,
        DispatchStrategy::Parallel,
        DispatchStrategy::LatestWins,
    ] {
        let styler = Arc::new(RecordingStyler::new());
        let engine = PipelineEngine::new(
            Arc::new(StaticItemSource::new(
                sample_frames(),
                Duration::from_millis(200),
            )),
            Arc::new(ScriptedProbe::new(3)),
            styler.clone(),
        )
        .with_config(
            EngineConfig::new()
                .with_style_latency_ms(150)
                .with_poll(PollPolicy::new().with_interval_ms(50).with_max_attempts(20)),
        );

        println!("=== {strategy} ===");
        let outcome = engine.run(strategy).await;
        for entry in engine.state_snapshot().log {
            println!(
                "step {:>2} [{:<6}] {:<7} {} ({})",
                entry.step,
                entry.label,
                entry.status.to_string(),
                entry.message,
                entry.timestamp
            );
        }
        println!("outcome: {outcome:?}");
        println!("styled frames: {:?}\n", styler.applied_ids());
    }

    let fetcher = Arc::new(CountingFetcher::ok(
        sample_filter_fields(),
        Duration::from_millis(100),
    ));
    let loader = CacheAwareLoader::new(fetcher.clone()).with_sink(Arc::new(LoggingEventSink));

    let first = loader.load().await;
    let second = loader.load().await;
    println!(
        "loader: first load {:?} fields, second load {:?} fields, upstream fetches: {}",
        first.config().map(|c| c.len()),
        second.config().map(|c| c.len()),
        fetcher.calls()
    );

    Ok(())
}
