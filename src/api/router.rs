use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_book, create_loan, delete_book, find_books, get_book, get_loan,
    update_book, update_loan,
};

/// Creates the API router with the catalog and loan endpoints
///
/// Books:
/// - POST /api/books - Register a book
/// - GET /api/books - Search books by example (paged)
/// - GET /api/books/:id - Get a book
/// - PUT /api/books/:id - Replace a book
/// - DELETE /api/books/:id - Delete a book
///
/// Loans:
/// - POST /api/loans - Loan a book by isbn
/// - GET /api/loans/:id - Get a loan
/// - PATCH /api/loans/:id - Update the returned flag
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/api/books", post(create_book).get(find_books))
        .route(
            "/api/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/api/loans", post(create_loan))
        .route("/api/loans/:id", get(get_loan).patch(update_loan))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
