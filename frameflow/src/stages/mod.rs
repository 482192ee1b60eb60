//! Per-item pipeline stages and their collaborator seams.

mod poll;
mod ports;
mod transform;

pub use poll::{PollJitter, PollPolicy, PollingWaiter};
pub use ports::{FrameStyler, ItemSource, ReadinessProbe};
pub use transform::StyleStage;
