//! Core data model shared by the engine, stages, and loader.

mod item;
mod log;

pub use item::{FrameItem, FrameSize, ReadyFrame};
pub use log::{LogEntry, LogStatus, STEP_FETCH, STEP_FINAL, STEP_PROBE, STEP_STYLE};
