//! Work-item data model for one pipeline run.

use serde::{Deserialize, Serialize};

/// Target presentation dimensions for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
}

impl FrameSize {
    /// Creates a new size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for FrameSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One embedded frame to prepare.
///
/// Immutable once fetched; owned by the engine for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameItem {
    /// Element identifier that the readiness probe and styler resolve.
    pub id: String,
    /// Display label used in log messages.
    pub title: String,
    /// Source locator of the embedded content.
    pub src: String,
    /// Dimensions to apply once the frame is ready.
    pub target: FrameSize,
}

impl FrameItem {
    /// Creates a new frame item.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        src: impl Into<String>,
        target: FrameSize,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            src: src.into(),
            target,
        }
    }
}

/// Proof, produced by polling, that a frame's element exists.
///
/// Consumed by the style stage and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyFrame {
    /// The originating item.
    pub item: FrameItem,
    /// How many probes it took to confirm the frame.
    pub attempts: usize,
}
