use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::infrastructure::AppState;

/// The full catalog as a bare JSON array, the shape the storefront loader
/// decodes.
pub async fn list_books(State(state): State<AppState>) -> impl IntoResponse {
    match state.book_repo.find_all().await {
        Ok(books) => (StatusCode::OK, Json(books)).into_response(),
        Err(e) => {
            tracing::error!("Failed to list books: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
