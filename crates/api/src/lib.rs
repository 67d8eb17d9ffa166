//! HTTP API layer for devlink.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: auth, profile, connection requests, user views, health
//! - **Extractors**: cookie/bearer authentication, JSON/path/query with uniform rejections
//! - **Middleware**: error boundary, rate limiting
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod rate_limit;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};

pub use endpoints::router;
pub use middleware::AppState;
pub use rate_limit::{ApiRateLimiter, RateLimitConfig, RateLimiterState};

/// Build the complete application: routes, fallback, rate limiting and the
/// error boundary, bound to `state`.
///
/// Transport concerns (CORS, tracing, timeouts, compression) are layered on
/// by the server binary.
pub fn app(state: AppState) -> Router {
    router()
        .layer(from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_middleware,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::error_boundary,
        ))
        .with_state(state)
}
