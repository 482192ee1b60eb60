//! Test support: recording collaborator doubles and canned fixtures.
//!
//! Used by the crate's own tests, the benches, and the runnable example.

mod fixtures;
mod mocks;

pub use fixtures::{sample_filter_fields, sample_frames};
pub use mocks::{
    CountingFetcher, FailingItemSource, RecordingStyler, ScriptedProbe, StaticItemSource,
};
