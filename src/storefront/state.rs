//! Catalog loading lifecycle as a pure reducer.

use std::sync::Arc;

use crate::models::Book;

/// Immutable catalog snapshot, replaced wholesale on reload
pub type Catalog = Arc<[Book]>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadingState {
    #[default]
    Loading,
    Loaded(Catalog),
    Failed(String),
    Searching(Catalog),
    Searched {
        catalog: Catalog,
        results: Arc<[Book]>,
    },
}

impl LoadingState {
    pub fn catalog(&self) -> Option<&Catalog> {
        match self {
            LoadingState::Loaded(catalog)
            | LoadingState::Searching(catalog)
            | LoadingState::Searched { catalog, .. } => Some(catalog),
            LoadingState::Loading | LoadingState::Failed(_) => None,
        }
    }

    /// Results of the last completed search, if one has been applied.
    pub fn results(&self) -> Option<&[Book]> {
        match self {
            LoadingState::Searched { results, .. } => Some(results),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum CatalogEvent {
    CatalogLoaded(Catalog),
    CatalogFailed(String),
    SearchStarted,
    SearchCompleted(Vec<Book>),
    Retry,
}

/// Compute the next state. Events that make no sense in the current state
/// leave it unchanged.
pub fn reduce(state: &LoadingState, event: CatalogEvent) -> LoadingState {
    use CatalogEvent as E;
    use LoadingState as S;

    match (state, event) {
        (S::Loading, E::CatalogLoaded(catalog)) => S::Loaded(catalog),
        (S::Loading, E::CatalogFailed(message)) => S::Failed(message),
        (S::Loaded(catalog), E::SearchStarted) => S::Searching(catalog.clone()),
        (S::Searched { catalog, .. }, E::SearchStarted) => S::Searching(catalog.clone()),
        (S::Searching(catalog), E::SearchCompleted(results)) => S::Searched {
            catalog: catalog.clone(),
            results: results.into(),
        },
        // A reload replaces the whole snapshot, whatever was shown before
        (_, E::Retry) => S::Loading,
        (current, event) => {
            tracing::trace!("Ignoring {:?} in state {:?}", event, current);
            current.clone()
        }
    }
}
