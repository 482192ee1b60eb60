//! Error types for the pipeline engine and the configuration loader.

use thiserror::Error;

/// The main error type for pipeline operations.
#[derive(Debug, Error)]
pub enum FrameflowError {
    /// The item source collaborator failed to produce the frame list.
    #[error("item source error: {0}")]
    Source(String),

    /// The frame styler collaborator rejected the mutation.
    #[error("frame styling failed for '{frame_id}': {message}")]
    Style {
        /// The frame whose styling failed.
        frame_id: String,
        /// Collaborator-supplied failure detail.
        message: String,
    },

    /// Readiness polling gave up after the configured attempt bound.
    #[error("frame '{frame_id}' not ready after {attempts} probes")]
    PollExhausted {
        /// The frame that never became ready.
        frame_id: String,
        /// Probes spent before giving up.
        attempts: usize,
    },

    /// The unit of work was torn down by its cancellation token.
    ///
    /// Not a failure: cancellation is a first-class terminal outcome.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// `reset` was called while a run is active.
    #[error("a pipeline run is in progress")]
    RunInProgress,
}

impl FrameflowError {
    /// Returns true if this error represents cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Error produced by the configuration loader.
///
/// `Clone` so every requester sharing a single in-flight fetch can receive
/// the same failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The upstream fetch collaborator failed.
    #[error("config fetch failed: {0}")]
    Fetch(String),
}
