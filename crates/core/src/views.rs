//! Client-facing projections of stored records.

use devlink_db::entities::{
    connection_request::{self, RequestStatus},
    user::{self, Gender},
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;

/// What any authenticated user may see about another user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    /// User ID.
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Age in years; 0 when unset.
    pub age: i32,
    /// Self-described gender.
    pub gender: Gender,
    /// Avatar URL.
    pub photo_url: String,
    /// Free-form bio.
    pub about: String,
    /// Normalized skill tags.
    pub skills: Vec<String>,
}

impl From<&user::Model> for PublicProfile {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            age: user.age,
            gender: user.gender,
            photo_url: user.photo_url.clone(),
            about: user.about.clone(),
            skills: user.skill_list(),
        }
    }
}

/// The account owner's own view: public fields plus email and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    #[serde(flatten)]
    pub profile: PublicProfile,
    /// Login email.
    pub email_id: String,
    /// Signup time.
    pub created_at: DateTimeWithTimeZone,
    /// Last profile change.
    pub updated_at: DateTimeWithTimeZone,
}

impl From<&user::Model> for AccountView {
    fn from(user: &user::Model) -> Self {
        Self {
            profile: PublicProfile::from(user),
            email_id: user.email.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// A stored connection request as returned by the send and review endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequestView {
    /// Request ID.
    pub id: String,
    /// Sender.
    pub from_user_id: String,
    /// Recipient.
    pub to_user_id: String,
    /// Current status.
    pub status: RequestStatus,
    /// When the request was sent.
    pub created_at: DateTimeWithTimeZone,
    /// When the status last changed.
    pub updated_at: DateTimeWithTimeZone,
}

impl From<&connection_request::Model> for ConnectionRequestView {
    fn from(request: &connection_request::Model) -> Self {
        Self {
            id: request.id.clone(),
            from_user_id: request.from_user_id.clone(),
            to_user_id: request.to_user_id.clone(),
            status: request.status,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

/// A pending inbound request with the sender expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedRequestView {
    /// Request ID.
    pub id: String,
    #[serde(rename = "fromUserId")]
    pub from_user: PublicProfile,
    /// Recipient, i.e. the caller.
    pub to_user_id: String,
    /// Always `interested`.
    pub status: RequestStatus,
    /// When the request was sent.
    pub created_at: DateTimeWithTimeZone,
    /// When the status last changed.
    pub updated_at: DateTimeWithTimeZone,
}

impl ReceivedRequestView {
    /// Combine an edge with its sender's profile.
    #[must_use]
    pub fn new(request: &connection_request::Model, from_user: PublicProfile) -> Self {
        Self {
            id: request.id.clone(),
            from_user,
            to_user_id: request.to_user_id.clone(),
            status: request.status,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

/// Page metadata for the user feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Requested page, echoed back even when past the end.
    pub current_page: u64,
    /// `ceil(total_users / limit)`.
    pub total_pages: u64,
    /// Number of registered users.
    pub total_users: u64,
    /// Whether a later page has rows.
    pub has_next: bool,
    /// Whether `current_page > 1`.
    pub has_prev: bool,
}

impl Pagination {
    /// Derive page metadata from the requested page and the total row count.
    #[must_use]
    pub const fn new(page: u64, limit: u64, total: u64) -> Self {
        let total_pages = total.div_ceil(limit);
        Self {
            current_page: page,
            total_pages,
            total_users: total,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// One page of the user feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedPage {
    /// Newest first.
    pub users: Vec<PublicProfile>,
    /// Page metadata.
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> user::Model {
        let now = Utc::now().into();
        user::Model {
            id: "01hv8z3q6n1e1yq4y0pz8k2xwm".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            age: 28,
            gender: Gender::Female,
            photo_url: "https://example.com/a.png".to_string(),
            about: String::new(),
            skills: serde_json::json!(["rust"]),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_public_profile_hides_credentials() {
        let json = serde_json::to_value(PublicProfile::from(&user())).unwrap_or_default();
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["gender"], "F");
        assert!(json.get("email").is_none());
        assert!(json.get("emailId").is_none());
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn test_account_view_flattens_profile() {
        let json = serde_json::to_value(AccountView::from(&user())).unwrap_or_default();
        assert_eq!(json["emailId"], "ada@example.com");
        assert_eq!(json["skills"][0], "rust");
        assert!(json.get("createdAt").is_some());
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn test_pagination_math() {
        let p = Pagination::new(1, 10, 25);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(!p.has_prev);

        let p = Pagination::new(3, 10, 25);
        assert!(!p.has_next);
        assert!(p.has_prev);

        let p = Pagination::new(1, 10, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next);
    }
}
