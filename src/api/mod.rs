pub mod books;
pub mod covers;
pub mod error;
pub mod events;
pub mod extract;
pub mod health;
pub mod lookup;
pub mod search;
pub mod views;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::infrastructure::AppState;

/// Body limit for the multipart upload routes.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub fn api_router(state: AppState) -> Router {
    let uploads = Router::new()
        .route("/books/form", post(books::submit_form))
        .route("/covers/upload", post(covers::upload_cover))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Open Library
        .route("/search", get(search::search_books))
        .route("/lookup", get(lookup::lookup_book))
        .route("/covers/search", get(covers::search_covers))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/prefill", post(books::prefill))
        .route("/books/conditions", get(books::list_conditions))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // Views
        .route("/views/table", get(views::table))
        .route("/views/grid", get(views::grid))
        .route("/events", get(events::event_stream))
        .merge(uploads)
        .with_state(state)
}
