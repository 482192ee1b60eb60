//! Cancellation token checked at every suspension point.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

type CancelCallback = Box<dyn Fn(&str) + Send + Sync>;

/// A token for cooperative cancellation.
///
/// Cancellation is idempotent; the first reason wins. Tokens form a tree:
/// cancelling a parent cancels every linked child, so tearing down a run
/// tears down all outstanding per-item work.
#[derive(Default)]
pub struct CancellationToken {
    cancelled: AtomicBool,
    reason: RwLock<Option<String>>,
    callbacks: RwLock<Vec<CancelCallback>>,
}

impl CancellationToken {
    /// Creates a fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Requests cancellation with a reason.
    ///
    /// Idempotent: only the first reason is kept. Callbacks run immediately;
    /// a panicking callback is logged and suppressed.
    pub fn cancel(&self, reason: impl Into<String>) {
        let reason = reason.into();
        if self
            .cancelled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            *self.reason.write() = Some(reason.clone());

            let callbacks = self.callbacks.read();
            for callback in callbacks.iter() {
                if std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| callback(&reason)))
                    .is_err()
                {
                    warn!("cancellation callback panicked");
                }
            }
        }
    }

    /// Registers a callback invoked when cancellation is requested.
    ///
    /// If the token is already cancelled, the callback runs immediately.
    pub fn on_cancel<F>(&self, callback: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        if self.is_cancelled() {
            let reason = self.reason().unwrap_or_default();
            callback(&reason);
        } else {
            self.callbacks.write().push(Box::new(callback));
        }
    }

    /// Returns a child token that is cancelled whenever `self` is.
    ///
    /// The child can be cancelled independently without affecting the parent.
    #[must_use]
    pub fn child(self: &Arc<Self>) -> Arc<Self> {
        let child = Self::new();
        let linked = Arc::downgrade(&child);
        self.on_cancel(move |reason| {
            if let Some(token) = linked.upgrade() {
                token.cancel(reason);
            }
        });
        child
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns the cancellation reason, if cancelled.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason.read().clone()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("reason", &self.reason())
            .finish()
    }
}
