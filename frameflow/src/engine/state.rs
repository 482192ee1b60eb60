//! Mutable state of one engine, reset at every run start.

use uuid::Uuid;

use crate::core::{FrameItem, LogEntry};

/// State owned exclusively by the engine.
///
/// Mutated only from the engine's run context; external readers receive
/// clones through the engine's snapshot accessors.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    /// Identity of the active (or most recent) run.
    pub run_id: Option<Uuid>,
    /// Whether a run is currently active.
    pub running: bool,
    /// Append-only log; entries are never mutated after append.
    pub log: Vec<LogEntry>,
    /// Item collection fetched for the run.
    pub items: Vec<FrameItem>,
}

impl RunState {
    /// Clears the log and the item collection.
    pub fn clear(&mut self) {
        self.log.clear();
        self.items.clear();
    }
}
