//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{StatusCode, header::CONTENT_LENGTH},
    middleware::Next,
    response::Response,
};
use devlink_common::{Config, ErrorReport};
use devlink_core::{ConnectionService, TokenService, UserService};
use devlink_db::repositories::{ConnectionRequestRepository, UserRepository};
use sea_orm::DatabaseConnection;
use tracing::{debug, error, warn};

use crate::rate_limit::{RateLimitConfig, RateLimiterState};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Immutable configuration.
    pub config: Arc<Config>,
    pub user_service: UserService,
    pub connection_service: ConnectionService,
    pub token_service: TokenService,
    pub rate_limiter: RateLimiterState,
    /// Process start, for the health endpoint.
    pub started_at: Instant,
}

impl AppState {
    /// Wire repositories and services over a database connection.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: Config) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let request_repo = ConnectionRequestRepository::new(db);

        Self {
            user_service: UserService::new(user_repo.clone()),
            connection_service: ConnectionService::new(request_repo, user_repo),
            token_service: TokenService::new(&config.auth),
            rate_limiter: RateLimiterState::new(RateLimitConfig::from(&config.rate_limit)),
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    /// Whether responses should be hardened for production.
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.config.server.environment.is_production()
    }
}

/// Central error boundary.
///
/// Every [`devlink_common::AppError`] response carries an [`ErrorReport`]
/// extension. The boundary logs it with the request line and, outside
/// production, rewrites the body to include the debug rendering.
pub async fn error_boundary(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();

    let mut response = next.run(req).await;
    let Some(report) = response.extensions_mut().remove::<ErrorReport>() else {
        return response;
    };

    if report.status.is_server_error() {
        error!(%method, %uri, code = report.code, error = %report.debug, "Request failed");
    } else if matches!(
        report.status,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
    ) {
        warn!(%method, %uri, code = report.code, message = %report.message, "Request rejected");
    } else {
        debug!(%method, %uri, code = report.code, message = %report.message, "Request rejected");
    }

    if state.is_production() {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(report.body(true).to_string()))
}
