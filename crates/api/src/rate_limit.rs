//! API rate limiting middleware.
//!
//! Fixed-window limits keyed by authenticated user, falling back to client IP.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use devlink_common::{AppError, config::RateLimitSettings};
use tokio::sync::RwLock;
use tracing::debug;

use crate::extractors::session_token;
use crate::middleware::AppState;

/// Rate limit configuration.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Time window duration in seconds.
    pub window_secs: u64,
}

impl RateLimitConfig {
    /// Create a new rate limit config.
    #[must_use]
    pub const fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
        }
    }
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self::new(settings.max_requests, settings.window_secs)
    }
}

/// Rate limit state for a single key.
#[derive(Debug, Clone)]
struct WindowState {
    /// Request count in current window.
    count: u32,
    /// Window start time.
    window_start: Instant,
}

impl WindowState {
    fn new() -> Self {
        Self {
            count: 0,
            window_start: Instant::now(),
        }
    }
}

/// In-memory fixed-window rate limiter.
#[derive(Clone, Default)]
pub struct ApiRateLimiter {
    /// State per key (user ID or IP address).
    states: Arc<RwLock<HashMap<String, WindowState>>>,
}

impl ApiRateLimiter {
    /// Create a new rate limiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a request is allowed and record it.
    pub async fn check(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult {
        let mut states = self.states.write().await;
        let now = Instant::now();
        let window = Duration::from_secs(config.window_secs);

        let state = states.entry(key.to_string()).or_insert_with(WindowState::new);

        if now.duration_since(state.window_start) >= window {
            state.count = 0;
            state.window_start = now;
        }

        let reset = window
            .saturating_sub(now.duration_since(state.window_start))
            .as_secs();

        if state.count >= config.max_requests {
            return RateLimitResult::Limited {
                retry_after: reset.max(1),
                limit: config.max_requests,
            };
        }

        state.count += 1;

        RateLimitResult::Allowed {
            remaining: config.max_requests.saturating_sub(state.count),
            limit: config.max_requests,
            reset,
        }
    }

    /// Drop keys whose window ended more than one window ago.
    pub async fn cleanup(&self, window_secs: u64) {
        let mut states = self.states.write().await;
        let now = Instant::now();
        let max_age = Duration::from_secs(window_secs.saturating_mul(2));

        states.retain(|_, state| now.duration_since(state.window_start) < max_age);
    }

    /// Get the number of tracked keys.
    pub async fn key_count(&self) -> usize {
        self.states.read().await.len()
    }
}

/// Rate limit check result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed.
    Allowed {
        /// Remaining requests in window.
        remaining: u32,
        /// Total limit.
        limit: u32,
        /// Seconds until window reset.
        reset: u64,
    },
    /// Request is rate limited.
    Limited {
        /// Seconds until rate limit resets.
        retry_after: u64,
        /// Total limit.
        limit: u32,
    },
}

/// Rate limiter state for middleware.
#[derive(Clone)]
pub struct RateLimiterState {
    /// Limits applied to every key.
    pub config: RateLimitConfig,
    /// Per-user rate limiter.
    pub user_limiter: ApiRateLimiter,
    /// Per-IP rate limiter (for unauthenticated requests).
    pub ip_limiter: ApiRateLimiter,
}

impl RateLimiterState {
    /// Create a new rate limiter state.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            user_limiter: ApiRateLimiter::new(),
            ip_limiter: ApiRateLimiter::new(),
        }
    }

    /// Evict stale keys from both limiters.
    pub async fn cleanup(&self) {
        self.user_limiter.cleanup(self.config.window_secs).await;
        self.ip_limiter.cleanup(self.config.window_secs).await;
    }
}

/// Extract client IP from proxy headers.
fn extract_client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    if let Some(first_ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        && let Ok(ip) = first_ip.trim().parse::<IpAddr>()
    {
        return Some(ip);
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<IpAddr>().ok())
}

/// Client IP from proxy headers, else the socket peer.
fn client_ip(req: &Request) -> Option<IpAddr> {
    extract_client_ip(req.headers()).or_else(|| {
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    })
}

/// Rate limiting middleware.
///
/// Requests with a verifiable session token are counted per user; all
/// others per client IP.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = session_token(req.headers())
        .and_then(|token| state.token_service.verify(&token).ok())
        .map(|claims| claims.sub);

    let limiter = &state.rate_limiter;
    let result = if let Some(user_id) = user_id {
        limiter
            .user_limiter
            .check(&format!("user:{user_id}"), &limiter.config)
            .await
    } else {
        let key = client_ip(&req)
            .map_or_else(|| "unknown".to_string(), |ip| format!("ip:{ip}"));
        limiter.ip_limiter.check(&key, &limiter.config).await
    };

    match result {
        RateLimitResult::Allowed {
            remaining,
            limit,
            reset,
        } => {
            let mut response = next.run(req).await;

            let headers = response.headers_mut();
            headers.insert("X-RateLimit-Limit", limit.into());
            headers.insert("X-RateLimit-Remaining", remaining.into());
            headers.insert("X-RateLimit-Reset", reset.into());

            Ok(response)
        }
        RateLimitResult::Limited { retry_after, limit } => {
            debug!(retry_after, limit, "Rate limit exceeded");
            Err(AppError::RateLimited { retry_after })
        }
    }
}
