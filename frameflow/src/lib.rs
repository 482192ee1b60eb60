//! # Frameflow
//!
//! An asynchronous pipeline engine for preparing embedded dashboard frames,
//! plus a cache-aware single-flight loader for filter configuration.
//!
//! A run fetches the frame list, then drives every frame through two stages
//! (poll until the frame's element exists, then apply its target styling)
//! under a caller-selected dispatch strategy:
//!
//! - **Sequential**: one frame at a time, in order
//! - **Parallel**: all frames concurrently pending
//! - **LatestWins**: each new frame pre-empts the one before it
//!
//! Stage logic is shared across strategies; only the scheduling discipline
//! differs. One frame failing never aborts its siblings, and every run
//! closes its log with exactly one terminal entry, even when cancelled.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use frameflow::prelude::*;
//!
//! let engine = PipelineEngine::new(source, probe, styler)
//!     .with_config(
//!         EngineConfig::new()
//!             .with_poll(PollPolicy::new().with_interval_ms(100)),
//!     );
//!
//! let outcome = engine.run(DispatchStrategy::Sequential).await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod core;
pub mod engine;
pub mod errors;
pub mod events;
pub mod loader;
pub mod stages;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::core::{FrameItem, FrameSize, LogEntry, LogStatus, ReadyFrame};
    pub use crate::engine::{
        DispatchStrategy, EngineConfig, ItemOutcome, PipelineEngine, RunOutcome, RunState,
    };
    pub use crate::errors::{FrameflowError, LoadError};
    pub use crate::events::{
        CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink,
    };
    pub use crate::loader::{
        CacheAwareLoader, CacheSnapshot, ConfigFetcher, FilterField, FilterKind, LoadOutcome,
    };
    pub use crate::stages::{
        FrameStyler, ItemSource, PollJitter, PollPolicy, PollingWaiter, ReadinessProbe,
        StyleStage,
    };
    pub use crate::utils::iso_timestamp;
}
