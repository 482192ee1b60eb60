//! Collaborator traits at the engine's interface boundary.
//!
//! The engine owns the decision logic only; fetching, DOM-style existence
//! checks, and the actual presentation mutation belong to these seams.

use async_trait::async_trait;

use crate::core::{FrameItem, FrameSize};
use crate::errors::FrameflowError;

/// Supplies the item collection for a run.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Fetches the frames to prepare.
    ///
    /// Latency is the collaborator's concern; the engine simply awaits.
    async fn fetch_items(&self) -> Result<Vec<FrameItem>, FrameflowError>;
}

/// Answers whether a frame's element currently exists.
///
/// Pure and side-effect free; the polling waiter calls it repeatedly.
pub trait ReadinessProbe: Send + Sync {
    /// Returns true once the element for `frame_id` exists.
    fn is_ready(&self, frame_id: &str) -> bool;
}

/// Applies target presentation attributes to a ready frame.
///
/// Synchronous and side-effecting: sets width, height, and border emphasis.
pub trait FrameStyler: Send + Sync {
    /// Mutates the frame identified by `frame_id` to `target`.
    fn apply_target(&self, frame_id: &str, target: &FrameSize) -> Result<(), FrameflowError>;
}
