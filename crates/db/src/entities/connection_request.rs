//! Connection request entity (directed edge between two users).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status label of a connection request.
///
/// `Ignore` and `Interested` are set by the sender; `Accepted` and `Rejected`
/// only by the recipient reviewing an `Interested` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[sea_orm(string_value = "ignore")]
    Ignore,
    #[sea_orm(string_value = "interested")]
    Interested,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl RequestStatus {
    /// Wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Interested => "interested",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a wire label. Labels are case-sensitive.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "ignore" => Some(Self::Ignore),
            "interested" => Some(Self::Interested),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "connection_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who sent the request
    pub from_user_id: String,

    /// The user who received the request
    pub to_user_id: String,

    /// Order-independent key of the pair, see [`pair_key`]
    #[sea_orm(unique)]
    pub pair_key: String,

    pub status: RequestStatus,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// The endpoint of this edge that is not `user_id`.
    #[must_use]
    pub fn other_party(&self, user_id: &str) -> &str {
        if self.from_user_id == user_id {
            &self.to_user_id
        } else {
            &self.from_user_id
        }
    }
}

/// Canonical key for an unordered pair of user IDs.
#[must_use]
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}:{b}")
    } else {
        format!("{b}:{a}")
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FromUserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    FromUser,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ToUserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    ToUser,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FromUser.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
