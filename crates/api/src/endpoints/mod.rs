//! API endpoints.

mod auth;
mod categories;
pub mod questions;
mod user;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/categories", categories::router())
        .nest("/questions", questions::router())
        .nest("/user", user::router())
}
