//! Append-only run log entries.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::clock_stamp;

/// Step number of the item-list fetch.
pub const STEP_FETCH: u32 = 1;
/// Step number of the readiness probe stage.
pub const STEP_PROBE: u32 = 2;
/// Step number of the style stage.
pub const STEP_STYLE: u32 = 3;
/// Step number of terminal and error entries.
pub const STEP_FINAL: u32 = 99;

/// Status of one log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    /// The step is in progress.
    Running,
    /// The step finished.
    Done,
    /// The step failed.
    Error,
}

impl LogStatus {
    /// Returns true if the status closes out a unit of work.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Done => write!(f, "done"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One entry in a run's append-only log.
///
/// Entries are never mutated after append; the presentation collaborator
/// reads them through state snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Step number (1 fetch, 2 probe, 3 style, 99 terminal).
    pub step: u32,
    /// Stage label.
    pub label: String,
    /// Human-readable message.
    pub message: String,
    /// Entry status.
    pub status: LogStatus,
    /// Wall-clock stamp (`mm:ss.mmm`).
    pub timestamp: String,
}

impl LogEntry {
    /// Creates an entry stamped with the current wall clock.
    #[must_use]
    pub fn new(
        step: u32,
        label: impl Into<String>,
        message: impl Into<String>,
        status: LogStatus,
    ) -> Self {
        Self {
            step,
            label: label.into(),
            message: message.into(),
            status,
            timestamp: clock_stamp(),
        }
    }

    /// Creates a `Running` entry.
    #[must_use]
    pub fn running(step: u32, label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(step, label, message, LogStatus::Running)
    }

    /// Creates a `Done` entry.
    #[must_use]
    pub fn done(step: u32, label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(step, label, message, LogStatus::Done)
    }

    /// Creates an `Error` entry.
    #[must_use]
    pub fn error(step: u32, label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(step, label, message, LogStatus::Error)
    }
}
