//! Cache-aware, single-flight configuration loading.
//!
//! Independent of the pipeline engine. A load request either hits the cache,
//! joins the fetch already in flight, or leads exactly one new upstream
//! fetch whose outcome is fanned out to every concurrent requester. The
//! cache check and the fetch-or-skip decision happen atomically under one
//! lock.

mod config;

pub use config::{FilterField, FilterKind};

use async_trait::async_trait;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use crate::errors::LoadError;
use crate::events::{EventSink, NoOpEventSink};

/// Upstream configuration fetch collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfigFetcher: Send + Sync {
    /// Fetches the filter configuration.
    async fn fetch_config(&self) -> Result<Vec<FilterField>, LoadError>;
}

/// Shared snapshot of the loader's cache slot.
#[derive(Debug, Clone, Default)]
pub struct CacheSnapshot {
    /// The cached configuration, if any.
    pub config: Option<Arc<Vec<FilterField>>>,
    /// Whether a fetch is currently in flight.
    pub loading: bool,
    /// The most recent fetch error, if the last fetch failed.
    pub last_error: Option<LoadError>,
}

/// Terminal outcome of one load request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Served from the cache; no fetch was issued.
    CacheHit(Arc<Vec<FilterField>>),
    /// Fetched upstream, or joined the in-flight fetch, successfully.
    Fetched(Arc<Vec<FilterField>>),
    /// The upstream fetch failed. The cache stays empty so a later request
    /// can retry.
    Failed(LoadError),
}

impl LoadOutcome {
    /// Returns the loaded configuration, if any.
    #[must_use]
    pub fn config(&self) -> Option<&Arc<Vec<FilterField>>> {
        match self {
            Self::CacheHit(config) | Self::Fetched(config) => Some(config),
            Self::Failed(_) => None,
        }
    }
}

type SharedFetch = Shared<BoxFuture<'static, Result<Arc<Vec<FilterField>>, LoadError>>>;

#[derive(Default)]
struct CacheSlot {
    config: Option<Arc<Vec<FilterField>>>,
    inflight: Option<SharedFetch>,
    last_error: Option<LoadError>,
}

/// Single-flight, cache-checked loader for the filter configuration.
pub struct CacheAwareLoader {
    fetcher: Arc<dyn ConfigFetcher>,
    sink: Arc<dyn EventSink>,
    slot: Mutex<CacheSlot>,
}

impl CacheAwareLoader {
    /// Creates a loader over the given fetch collaborator.
    #[must_use]
    pub fn new(fetcher: Arc<dyn ConfigFetcher>) -> Self {
        Self {
            fetcher,
            sink: Arc::new(NoOpEventSink),
            slot: Mutex::new(CacheSlot::default()),
        }
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns a snapshot of the cache slot.
    #[must_use]
    pub fn cache_snapshot(&self) -> CacheSnapshot {
        let slot = self.slot.lock();
        CacheSnapshot {
            config: slot.config.clone(),
            loading: slot.inflight.is_some(),
            last_error: slot.last_error.clone(),
        }
    }

    /// Handles one load request.
    ///
    /// The snapshot of cache state and the fetch-or-skip decision are taken
    /// atomically: a request either hits the cache, joins the fetch already
    /// in flight, or registers exactly one new upstream fetch before the
    /// lock is released.
    pub async fn load(&self) -> LoadOutcome {
        let shared = {
            let mut slot = self.slot.lock();
            if let Some(config) = &slot.config {
                debug!("serving filter config from cache");
                self.sink.emit("load.cache_hit", None);
                return LoadOutcome::CacheHit(config.clone());
            }
            match &slot.inflight {
                Some(shared) => shared.clone(),
                None => {
                    debug!("no cached filter config, fetching upstream");
                    let fetcher = self.fetcher.clone();
                    let shared = async move { fetcher.fetch_config().await.map(Arc::new) }
                        .boxed()
                        .shared();
                    slot.inflight = Some(shared.clone());
                    shared
                }
            }
        };

        let result = shared.clone().await;

        // Whichever requester settles first records the outcome; late joiners
        // of an already-settled fetch must not clobber a newer in-flight one.
        let mut slot = self.slot.lock();
        let settles = slot
            .inflight
            .as_ref()
            .is_some_and(|current| Shared::ptr_eq(current, &shared));
        if settles {
            slot.inflight = None;
            match &result {
                Ok(config) => {
                    slot.config = Some(config.clone());
                    slot.last_error = None;
                }
                Err(err) => {
                    slot.last_error = Some(err.clone());
                }
            }
        }
        drop(slot);

        match result {
            Ok(config) => {
                if settles {
                    self.sink.emit(
                        "load.succeeded",
                        Some(serde_json::json!({ "fields": config.len() })),
                    );
                }
                LoadOutcome::Fetched(config)
            }
            Err(err) => {
                if settles {
                    self.sink.emit(
                        "load.failed",
                        Some(serde_json::json!({ "error": err.to_string() })),
                    );
                }
                LoadOutcome::Failed(err)
            }
        }
    }
}
