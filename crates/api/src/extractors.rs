//! Request extractors.

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use axum_extra::{
    extract::cookie::CookieJar,
    headers::{Authorization, HeaderMapExt, authorization::Bearer},
};
use devlink_common::AppError;
use devlink_db::entities::user;

use crate::middleware::AppState;

/// Name of the session cookie.
pub const TOKEN_COOKIE: &str = "token";

/// Session token from the `token` cookie, falling back to `Authorization: Bearer`.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(TOKEN_COOKIE)
        && !cookie.value().is_empty()
    {
        return Some(cookie.value().to_string());
    }

    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = session_token(&parts.headers).ok_or_else(|| {
            AppError::Unauthorized("Authentication token is missing".to_string())
        })?;

        let claims = state.token_service.verify(&token)?;
        let user = state.user_service.get(&claims.sub).await?;

        Ok(Self(user))
    }
}

/// JSON body whose rejections are reported as [`AppError::BadRequest`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path parameters whose rejections are reported as [`AppError::BadRequest`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Query string whose rejections are reported as [`AppError::BadRequest`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
