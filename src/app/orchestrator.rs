use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout, Instant};

use crate::config::{Config, RefreshMode};
use crate::fetch::{FetchError, FetchResult, NseSource, SnapshotSource};
use crate::records::{Snapshot, SnapshotCache};

struct Inner {
    source: Arc<dyn SnapshotSource>,
    cache: Arc<SnapshotCache>,
    fetch_timeout: Duration,
}

impl Inner {
    async fn refresh(&self) -> FetchResult<Arc<Snapshot>> {
        let started = Instant::now();

        let outcome = match timeout(self.fetch_timeout, self.source.fetch_snapshot()).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Abandoned(self.fetch_timeout)),
        };

        match outcome {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.cache.replace(Arc::clone(&snapshot));
                log::info!(
                    "Market snapshot refreshed with {} records in {:?}",
                    snapshot.len(),
                    started.elapsed()
                );
                Ok(snapshot)
            }
            Err(err) => {
                log::warn!(
                    "Market snapshot refresh failed ({}): {}; keeping {} cached records",
                    err.kind(),
                    err,
                    self.cache.get().len()
                );
                Err(err)
            }
        }
    }
}

/// Fetch-or-fallback entry point handed to request handlers.
///
/// Cloning is cheap; clones share the source, the cache and the in-flight
/// flag used by [`RefreshMode::Background`].
#[derive(Clone)]
pub struct SnapshotOrchestrator {
    inner: Arc<Inner>,
    mode: RefreshMode,
    refreshing: Arc<AtomicBool>,
}

impl SnapshotOrchestrator {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        cache: Arc<SnapshotCache>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                cache,
                fetch_timeout,
            }),
            mode: RefreshMode::Synchronous,
            refreshing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Wire the production NSE source and a fresh cache from config.
    pub fn from_config(config: Arc<Config>) -> Self {
        let fetch_timeout = config.http.fetch_timeout;
        let mode = config.refresh;
        Self::new(
            Arc::new(NseSource::new(config)),
            Arc::new(SnapshotCache::new()),
            fetch_timeout,
        )
        .with_mode(mode)
    }

    pub fn with_mode(mut self, mode: RefreshMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> RefreshMode {
        self.mode
    }

    pub fn cache(&self) -> &Arc<SnapshotCache> {
        &self.inner.cache
    }

    /// One prime-and-retrieve cycle; the cache is replaced only on success.
    pub async fn refresh(&self) -> FetchResult<Arc<Snapshot>> {
        self.inner.refresh().await
    }

    /// Always yields a snapshot: fresh when the upstream cooperates, the
    /// last good one (possibly empty) otherwise.
    pub async fn fetch_market_snapshot(&self) -> Arc<Snapshot> {
        match self.mode {
            RefreshMode::Synchronous => {
                // Failure is already logged; the cache is the answer either way.
                let _ = self.refresh().await;
            }
            RefreshMode::Background => {
                self.spawn_refresh();
            }
        }
        self.inner.cache.get()
    }

    /// Start a detached refresh unless one is already running.
    ///
    /// Returns whether a new refresh was started.
    pub fn spawn_refresh(&self) -> bool {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("Snapshot refresh already in flight; serving cache");
            return false;
        }

        let inner = Arc::clone(&self.inner);
        let guard = InFlight(Arc::clone(&self.refreshing));
        tokio::spawn(async move {
            let _guard = guard;
            let _ = inner.refresh().await;
        });
        true
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }
}

/// Clears the in-flight flag even if the refresh task is cancelled.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
