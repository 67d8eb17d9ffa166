//! User views: inbox, connections, feed, lookups and deletion.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use devlink_common::AppResult;
use devlink_core::{
    validation::{EmailQuery, PaginationQuery, parse_user_id},
    views::{FeedPage, PublicProfile, ReceivedRequestView},
};
use serde::Serialize;
use validator::Validate;

use super::{auth, profile};
use crate::{
    extractors::{ApiPath, ApiQuery, AuthUser},
    middleware::AppState,
    response::{ApiResponse, MessageResponse},
};

/// Received requests response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedResponse {
    pub message: String,
    pub received_requests: Vec<ReceivedRequestView>,
}

/// Connections response.
#[derive(Serialize)]
pub struct ConnectionsResponse {
    pub message: String,
    pub data: Vec<PublicProfile>,
}

async fn received(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ReceivedResponse>> {
    let received_requests = state.connection_service.received(&user.id).await?;

    Ok(Json(ReceivedResponse {
        message: "Data fetched successfully".to_string(),
        received_requests,
    }))
}

async fn connections(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ConnectionsResponse>> {
    let data = state.connection_service.connections(&user.id).await?;

    Ok(Json(ConnectionsResponse {
        message: "Connections fetched successfully".to_string(),
        data,
    }))
}

async fn feed(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PaginationQuery>,
) -> AppResult<Json<FeedPage>> {
    Ok(Json(state.user_service.feed(query).await?))
}

async fn get_by_id(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<String>,
) -> AppResult<Json<PublicProfile>> {
    let user_id = parse_user_id(&user_id)?;
    let user = state.user_service.get(&user_id).await?;

    Ok(Json(PublicProfile::from(&user)))
}

async fn get_by_email(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EmailQuery>,
) -> AppResult<Json<PublicProfile>> {
    query.validate()?;
    let user = state.user_service.get_by_email(&query.email_id).await?;

    Ok(Json(PublicProfile::from(&user)))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<String>,
) -> AppResult<ApiResponse<MessageResponse>> {
    let user_id = parse_user_id(&user_id)?;
    state.user_service.delete(&user.id, &user_id).await?;

    Ok(ApiResponse::ok(MessageResponse::new("User deleted successfully")))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/requests/received", get(received))
        .route("/requests/connections", get(connections))
        .route("/feed", get(feed))
        .route("/user", get(get_by_email))
        .route("/user/{user_id}", get(get_by_id).delete(delete))
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/profile", get(profile::view))
}
