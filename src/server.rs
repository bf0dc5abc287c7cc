//! HTTP server and routes.

mod handlers;
pub mod pages;
pub mod session;
mod state;

pub use state::AppState;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Accounts
        .route("/", get(handlers::index).post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/logout", get(handlers::logout))
        // Books and reviews
        .route("/books", get(handlers::dashboard))
        .route(
            "/books/add",
            get(handlers::add_review_form).post(handlers::add_review),
        )
        .route(
            "/books/{id}",
            get(handlers::show_book).post(handlers::review_book),
        )
        .route("/users/{id}", get(handlers::show_user))
        .route("/delete/{id}", get(handlers::delete_review))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
