//! Own-profile endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, patch, post},
};
use axum_extra::extract::cookie::CookieJar;
use devlink_common::AppResult;
use devlink_core::{
    validation::{ResetPasswordInput, UpdateProfileInput},
    views::AccountView,
};

use super::auth::clear_session;
use crate::{
    extractors::{ApiJson, AuthUser},
    middleware::AppState,
    response::{ApiResponse, MessageResponse, UserResponse},
};

pub(super) async fn view(AuthUser(user): AuthUser) -> Json<AccountView> {
    Json(AccountView::from(&user))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<UpdateProfileInput>,
) -> AppResult<ApiResponse<UserResponse<AccountView>>> {
    let updated = state.user_service.update_profile(&user.id, input).await?;

    Ok(ApiResponse::ok(UserResponse {
        message: "User updated successfully".to_string(),
        user: AccountView::from(&updated),
    }))
}

/// Change the password and end the current session.
async fn reset_password(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(input): ApiJson<ResetPasswordInput>,
) -> AppResult<(CookieJar, ApiResponse<MessageResponse>)> {
    state.user_service.reset_password(&user.id, input).await?;

    Ok((
        clear_session(jar),
        ApiResponse::ok(MessageResponse::new(
            "Password reset successfully. Please login with your new password.",
        )),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/view", get(view))
        .route("/update", patch(update))
        .route("/reset-password", post(reset_password))
}
