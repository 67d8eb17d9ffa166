//! API endpoints.

mod auth;
mod health;
mod profile;
mod requests;
mod users;

use axum::{Router, http::Uri};
use devlink_common::AppError;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/auth", auth::router())
        .nest("/profile", profile::router())
        .nest("/requests", requests::router())
        .nest("/user", users::router())
        .fallback(not_found)
}

/// Fallback for unmatched routes.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {} not found", uri.path()))
}
