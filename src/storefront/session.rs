//! Async driver for the catalog lifecycle.
//!
//! Owns the current [`LoadingState`] and publishes every transition on a
//! watch channel. Searches run on the blocking pool; each one takes a ticket
//! from a generation counter and only the holder of the newest ticket may
//! publish its results.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::loader::{CatalogLoader, LoadError};
use super::search::{SearchCriteria, search};
use super::state::{Catalog, CatalogEvent, LoadingState, reduce};

pub struct CatalogSession {
    loader: CatalogLoader,
    state: Arc<watch::Sender<LoadingState>>,
    generation: Arc<AtomicU64>,
}

impl CatalogSession {
    pub fn new(loader: CatalogLoader) -> Self {
        let (state, _) = watch::channel(LoadingState::Loading);
        Self {
            loader,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadingState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> LoadingState {
        self.state.borrow().clone()
    }

    fn dispatch(&self, event: CatalogEvent) {
        self.state.send_modify(|state| *state = reduce(state, event));
    }

    /// Load the catalog and run the initial unfiltered search.
    ///
    /// Returns `true` when a catalog is available afterwards.
    pub async fn load(&self) -> bool {
        let outcome = self.loader.load().await;
        self.settle(outcome).await
    }

    /// Drop the cached catalog and load from the endpoint again.
    pub async fn retry(&self) -> bool {
        self.dispatch(CatalogEvent::Retry);
        let outcome = self.loader.refresh().await;
        self.settle(outcome).await
    }

    async fn settle(&self, outcome: Result<Catalog, LoadError>) -> bool {
        match outcome {
            Ok(catalog) => {
                self.dispatch(CatalogEvent::CatalogLoaded(catalog));
                // A newer search issued meanwhile wins; the catalog is still loaded.
                if let Err(e) = self.search(SearchCriteria::default()).await {
                    tracing::error!("Initial search task failed: {}", e);
                }
                true
            }
            Err(e) => {
                tracing::warn!("Catalog load failed: {}", e);
                self.dispatch(CatalogEvent::CatalogFailed(e.user_message()));
                false
            }
        }
    }

    /// Start a search over the loaded catalog.
    ///
    /// Supersedes any search still in flight. The handle resolves to whether
    /// this search's results were published; a stale or catalog-less search
    /// resolves to `false`.
    pub fn search(&self, criteria: SearchCriteria) -> JoinHandle<bool> {
        let mut ticket = 0;
        let mut catalog = None;
        // Taking the ticket under the channel lock orders it against the
        // completion check below.
        self.state.send_modify(|state| {
            ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = reduce(state, CatalogEvent::SearchStarted);
            if matches!(state, LoadingState::Searching(_)) {
                catalog = state.catalog().cloned();
            }
        });

        let Some(catalog) = catalog else {
            tracing::debug!("Search requested before a catalog was loaded");
            return tokio::spawn(async { false });
        };

        let state = Arc::clone(&self.state);
        let generation = Arc::clone(&self.generation);
        tokio::spawn(async move {
            let results =
                match tokio::task::spawn_blocking(move || search(&catalog, &criteria)).await {
                    Ok(results) => results,
                    Err(e) => {
                        tracing::error!("Search worker failed: {}", e);
                        return false;
                    }
                };

            let applied = state.send_if_modified(|state| {
                // A reload may have replaced the catalog while this ran
                if generation.load(Ordering::SeqCst) != ticket
                    || !matches!(state, LoadingState::Searching(_))
                {
                    return false;
                }
                *state = reduce(state, CatalogEvent::SearchCompleted(results));
                true
            });

            if !applied {
                tracing::debug!("Discarding results of superseded search #{}", ticket);
            }
            applied
        })
    }
}
