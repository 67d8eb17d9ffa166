//! Authentication endpoints.

use axum::{Router, extract::State, routing::post};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use devlink_common::AppResult;
use devlink_core::{
    validation::{LoginInput, SignupInput},
    views::AccountView,
};
use tracing::info;

use crate::{
    extractors::{ApiJson, AuthUser, TOKEN_COOKIE},
    middleware::AppState,
    response::{ApiResponse, MessageResponse, UserResponse},
};

/// Session cookie carrying `token`.
pub(crate) fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Remove the session cookie from `jar`.
pub(crate) fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(TOKEN_COOKIE).path("/"))
}

/// Create a new account.
pub(super) async fn signup(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SignupInput>,
) -> AppResult<ApiResponse<UserResponse<AccountView>>> {
    let user = state.user_service.signup(input).await?;

    Ok(ApiResponse::created(UserResponse {
        message: "User created successfully".to_string(),
        user: AccountView::from(&user),
    }))
}

/// Log in and set the session cookie.
pub(super) async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(input): ApiJson<LoginInput>,
) -> AppResult<(CookieJar, ApiResponse<UserResponse<AccountView>>)> {
    let user = state.user_service.login(input).await?;
    let token = state.token_service.issue(&user.id)?;

    info!(user_id = %user.id, "User logged in");

    let jar = jar.add(session_cookie(token, state.is_production()));
    Ok((
        jar,
        ApiResponse::ok(UserResponse {
            message: "Login successful".to_string(),
            user: AccountView::from(&user),
        }),
    ))
}

/// Clear the session cookie.
async fn logout(
    AuthUser(user): AuthUser,
    jar: CookieJar,
) -> (CookieJar, ApiResponse<MessageResponse>) {
    info!(user_id = %user.id, "User logged out");

    (
        clear_session(jar),
        ApiResponse::ok(MessageResponse::new("Logout successful")),
    )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
}
