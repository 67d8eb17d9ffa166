//! Connection request endpoints.

use axum::{Router, extract::State, routing::post};
use devlink_common::AppResult;
use devlink_core::{ConnectionOutcome, views::ConnectionRequestView};
use serde::Serialize;

use crate::{
    extractors::{ApiPath, AuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Send/review response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequestResponse {
    pub message: String,
    pub connection_request: ConnectionRequestView,
}

impl From<ConnectionOutcome> for ConnectionRequestResponse {
    fn from(outcome: ConnectionOutcome) -> Self {
        Self {
            message: outcome.message,
            connection_request: ConnectionRequestView::from(&outcome.request),
        }
    }
}

/// `POST /requests/send/{status}/{to_user_id}`
async fn send(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ApiPath((status, to_user_id)): ApiPath<(String, String)>,
) -> AppResult<ApiResponse<ConnectionRequestResponse>> {
    let outcome = state
        .connection_service
        .send(&user.id, &status, &to_user_id)
        .await?;

    Ok(ApiResponse::created(outcome.into()))
}

/// `POST /requests/review/{status}/{to_user_id}`
///
/// `to_user_id` names the user who sent the request; the caller reviews it.
async fn review(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ApiPath((status, requester_id)): ApiPath<(String, String)>,
) -> AppResult<ApiResponse<ConnectionRequestResponse>> {
    let outcome = state
        .connection_service
        .review(&user.id, &status, &requester_id)
        .await?;

    Ok(ApiResponse::ok(outcome.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/send/{status}/{to_user_id}", post(send))
        .route("/review/{status}/{to_user_id}", post(review))
}
