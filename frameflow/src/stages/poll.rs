//! Readiness polling: retry-until-found with cooperative cancellation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::cancellation::CancellationToken;
use crate::core::{FrameItem, ReadyFrame};
use crate::errors::FrameflowError;
use crate::stages::ReadinessProbe;

/// Jitter applied between probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollJitter {
    /// Fixed interval.
    #[default]
    None,
    /// Random delay from 0 to the interval.
    Full,
}

/// Polling cadence and bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    /// Delay between probes in milliseconds.
    pub interval_ms: u64,
    /// Probe bound; `None` polls until found or cancelled.
    pub max_attempts: Option<usize>,
    /// Jitter strategy.
    pub jitter: PollJitter,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            max_attempts: None,
            jitter: PollJitter::None,
        }
    }
}

impl PollPolicy {
    /// Creates the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the probe interval.
    #[must_use]
    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Bounds the number of probes.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Sets the jitter strategy.
    #[must_use]
    pub fn with_jitter(mut self, jitter: PollJitter) -> Self {
        self.jitter = jitter;
        self
    }

    fn delay(&self) -> Duration {
        let ms = match self.jitter {
            PollJitter::None => self.interval_ms,
            PollJitter::Full => {
                if self.interval_ms == 0 {
                    0
                } else {
                    rand::thread_rng().gen_range(0..=self.interval_ms)
                }
            }
        };
        Duration::from_millis(ms)
    }
}

/// Waits for a frame's element to exist.
///
/// The first probe fires immediately; further probes follow the policy
/// interval. The loop is iterative, so cancellation is a single flag check
/// and no timer survives a successful probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct PollingWaiter {
    policy: PollPolicy,
}

impl PollingWaiter {
    /// Creates a waiter with the given policy.
    #[must_use]
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    /// Polls `probe` until it confirms `item`'s frame.
    ///
    /// Produces the handle for the first truthy probe and stops scheduling
    /// immediately. Returns `FrameflowError::Cancelled` without producing a
    /// handle if the token fires, and `FrameflowError::PollExhausted` once
    /// the configured bound is spent.
    pub async fn wait(
        &self,
        item: &FrameItem,
        probe: &dyn ReadinessProbe,
        token: &CancellationToken,
    ) -> Result<ReadyFrame, FrameflowError> {
        let mut attempts = 0;
        loop {
            if token.is_cancelled() {
                return Err(FrameflowError::Cancelled(
                    token.reason().unwrap_or_default(),
                ));
            }

            attempts += 1;
            if probe.is_ready(&item.id) {
                debug!(frame = %item.id, attempts, "frame ready");
                return Ok(ReadyFrame {
                    item: item.clone(),
                    attempts,
                });
            }

            if let Some(max) = self.policy.max_attempts {
                if attempts >= max {
                    return Err(FrameflowError::PollExhausted {
                        frame_id: item.id.clone(),
                        attempts,
                    });
                }
            }

            tokio::time::sleep(self.policy.delay()).await;
        }
    }
}
