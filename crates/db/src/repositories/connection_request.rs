//! Connection request repository.

use std::sync::Arc;

use crate::entities::{
    ConnectionRequest,
    connection_request::{self, RequestStatus, pair_key},
};
use crate::{db_error, write_error};
use chrono::{DateTime, FixedOffset};
use devlink_common::AppResult;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, sea_query::Expr,
};

/// Connection request repository for database operations.
#[derive(Clone)]
pub struct ConnectionRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl ConnectionRequestRepository {
    /// Create a new connection request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the edge between two users, in either direction.
    pub async fn find_between(
        &self,
        a: &str,
        b: &str,
    ) -> AppResult<Option<connection_request::Model>> {
        ConnectionRequest::find()
            .filter(connection_request::Column::PairKey.eq(pair_key(a, b)))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Insert a request. A duplicate pair surfaces as a conflict.
    pub async fn create(
        &self,
        model: connection_request::ActiveModel,
    ) -> AppResult<connection_request::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| write_error(e, "Connection Request already exists"))
    }

    /// Move a pending request from `from_user_id` to `to_user_id` into `decision`.
    ///
    /// Single conditional UPDATE; returns `None` when no `interested` edge
    /// matched, including when it was already reviewed.
    pub async fn review(
        &self,
        from_user_id: &str,
        to_user_id: &str,
        decision: RequestStatus,
        now: DateTime<FixedOffset>,
    ) -> AppResult<Option<connection_request::Model>> {
        let result = ConnectionRequest::update_many()
            .col_expr(connection_request::Column::Status, Expr::value(decision))
            .col_expr(connection_request::Column::UpdatedAt, Expr::value(now))
            .filter(connection_request::Column::FromUserId.eq(from_user_id))
            .filter(connection_request::Column::ToUserId.eq(to_user_id))
            .filter(connection_request::Column::Status.eq(RequestStatus::Interested))
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        ConnectionRequest::find()
            .filter(connection_request::Column::FromUserId.eq(from_user_id))
            .filter(connection_request::Column::ToUserId.eq(to_user_id))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Pending inbound requests for a user, newest first.
    pub async fn find_received(
        &self,
        to_user_id: &str,
    ) -> AppResult<Vec<connection_request::Model>> {
        ConnectionRequest::find()
            .filter(connection_request::Column::ToUserId.eq(to_user_id))
            .filter(connection_request::Column::Status.eq(RequestStatus::Interested))
            .order_by_desc(connection_request::Column::CreatedAt)
            .order_by_desc(connection_request::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Accepted edges touching a user on either side, most recently accepted first.
    pub async fn find_accepted_for(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<connection_request::Model>> {
        ConnectionRequest::find()
            .filter(
                Condition::any()
                    .add(connection_request::Column::FromUserId.eq(user_id))
                    .add(connection_request::Column::ToUserId.eq(user_id)),
            )
            .filter(connection_request::Column::Status.eq(RequestStatus::Accepted))
            .order_by_desc(connection_request::Column::UpdatedAt)
            .order_by_desc(connection_request::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }
}
