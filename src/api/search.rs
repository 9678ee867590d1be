use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::infrastructure::AppState;
use crate::storefront::search::{BookSort, SearchCriteria, search};

#[derive(Debug, Deserialize, Default)]
pub struct SearchQuery {
    /// Title or description fragment
    pub q: Option<String>,
    pub author: Option<String>,
    /// Comma-separated genre fragments
    pub genres: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sort: Option<BookSort>,
}

impl From<SearchQuery> for SearchCriteria {
    fn from(params: SearchQuery) -> Self {
        let defaults = SearchCriteria::default();
        Self {
            text: params.q.unwrap_or_default(),
            author: params.author.unwrap_or_default(),
            genres: params.genres.unwrap_or_default(),
            min_price: params.min_price.unwrap_or(defaults.min_price),
            max_price: params.max_price.unwrap_or(defaults.max_price),
            sort: params.sort.unwrap_or(defaults.sort),
        }
    }
}

/// Same in-memory search the storefront runs, over a fresh table read.
pub async fn search_books(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> impl IntoResponse {
    let criteria = SearchCriteria::from(params);

    match state.book_repo.find_all().await {
        Ok(books) => {
            let results = search(&books, &criteria);
            tracing::debug!(
                "Search {:?} matched {} of {} books",
                criteria,
                results.len(),
                books.len()
            );
            (StatusCode::OK, Json(results)).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to search books: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
