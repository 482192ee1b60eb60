//! Recording doubles for the collaborator seams.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::core::{FrameItem, FrameSize};
use crate::errors::{FrameflowError, LoadError};
use crate::loader::{ConfigFetcher, FilterField};
use crate::stages::{FrameStyler, ItemSource, ReadinessProbe};

/// An item source that serves a fixed collection after a simulated latency.
#[derive(Debug)]
pub struct StaticItemSource {
    items: Vec<FrameItem>,
    latency: Duration,
}

impl StaticItemSource {
    /// Creates a source over `items`.
    #[must_use]
    pub fn new(items: Vec<FrameItem>, latency: Duration) -> Self {
        Self { items, latency }
    }
}

#[async_trait]
impl ItemSource for StaticItemSource {
    async fn fetch_items(&self) -> Result<Vec<FrameItem>, FrameflowError> {
        tokio::time::sleep(self.latency).await;
        Ok(self.items.clone())
    }
}

/// An item source that always fails.
#[derive(Debug)]
pub struct FailingItemSource {
    message: String,
}

impl FailingItemSource {
    /// Creates a source failing with `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl ItemSource for FailingItemSource {
    async fn fetch_items(&self) -> Result<Vec<FrameItem>, FrameflowError> {
        Err(FrameflowError::Source(self.message.clone()))
    }
}

/// A readiness probe that confirms a frame on its nth probe.
///
/// Every frame uses the default threshold unless overridden per id. A
/// threshold of `usize::MAX` means the frame never becomes ready.
#[derive(Debug)]
pub struct ScriptedProbe {
    default_after: usize,
    ready_after: Mutex<HashMap<String, usize>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedProbe {
    /// Creates a probe confirming every frame on probe number `default_after`.
    #[must_use]
    pub fn new(default_after: usize) -> Self {
        Self {
            default_after,
            ready_after: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a probe confirming every frame on the first probe.
    #[must_use]
    pub fn ready_immediately() -> Self {
        Self::new(1)
    }

    /// Overrides the threshold for one frame.
    pub fn set_ready_after(&self, frame_id: impl Into<String>, after: usize) {
        self.ready_after.lock().insert(frame_id.into(), after);
    }

    /// Marks one frame as permanently unavailable.
    pub fn never_ready(&self, frame_id: impl Into<String>) {
        self.set_ready_after(frame_id, usize::MAX);
    }

    /// Returns how many times `frame_id` was probed.
    #[must_use]
    pub fn probe_count(&self, frame_id: &str) -> usize {
        self.calls.lock().get(frame_id).copied().unwrap_or(0)
    }
}

impl ReadinessProbe for ScriptedProbe {
    fn is_ready(&self, frame_id: &str) -> bool {
        let mut calls = self.calls.lock();
        let count = calls.entry(frame_id.to_string()).or_insert(0);
        *count += 1;

        let threshold = self
            .ready_after
            .lock()
            .get(frame_id)
            .copied()
            .unwrap_or(self.default_after);
        *count >= threshold
    }
}

/// A styler that records applications in order and can fail per frame.
#[derive(Debug, Default)]
pub struct RecordingStyler {
    applied: Mutex<Vec<(String, FrameSize)>>,
    fail_ids: Mutex<HashSet<String>>,
}

impl RecordingStyler {
    /// Creates an empty recording styler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes applications for `frame_id` fail.
    pub fn fail_for(&self, frame_id: impl Into<String>) {
        self.fail_ids.lock().insert(frame_id.into());
    }

    /// Returns the recorded applications in order.
    #[must_use]
    pub fn applied(&self) -> Vec<(String, FrameSize)> {
        self.applied.lock().clone()
    }

    /// Returns the ids of styled frames in application order.
    #[must_use]
    pub fn applied_ids(&self) -> Vec<String> {
        self.applied.lock().iter().map(|(id, _)| id.clone()).collect()
    }
}

impl FrameStyler for RecordingStyler {
    fn apply_target(&self, frame_id: &str, target: &FrameSize) -> Result<(), FrameflowError> {
        if self.fail_ids.lock().contains(frame_id) {
            return Err(FrameflowError::Style {
                frame_id: frame_id.to_string(),
                message: "element rejected the mutation".to_string(),
            });
        }
        self.applied.lock().push((frame_id.to_string(), *target));
        Ok(())
    }
}

/// A config fetcher that counts calls and serves a configurable result.
#[derive(Debug)]
pub struct CountingFetcher {
    latency: Duration,
    calls: AtomicUsize,
    result: Mutex<Result<Vec<FilterField>, LoadError>>,
}

impl CountingFetcher {
    /// Creates a fetcher that succeeds with `fields`.
    #[must_use]
    pub fn ok(fields: Vec<FilterField>, latency: Duration) -> Self {
        Self {
            latency,
            calls: AtomicUsize::new(0),
            result: Mutex::new(Ok(fields)),
        }
    }

    /// Creates a fetcher that fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>, latency: Duration) -> Self {
        Self {
            latency,
            calls: AtomicUsize::new(0),
            result: Mutex::new(Err(LoadError::Fetch(message.into()))),
        }
    }

    /// Replaces the served result.
    pub fn set_result(&self, result: Result<Vec<FilterField>, LoadError>) {
        *self.result.lock() = result;
    }

    /// Returns how many fetches were issued.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigFetcher for CountingFetcher {
    async fn fetch_config(&self) -> Result<Vec<FilterField>, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        self.result.lock().clone()
    }
}
