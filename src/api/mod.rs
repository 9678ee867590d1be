pub mod books;
pub mod health;
pub mod search;

use axum::{Router, routing::get};

use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Books
        .route("/books", get(books::list_books))
        .route("/books/search", get(search::search_books))
        .with_state(state)
}
