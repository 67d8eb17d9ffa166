//! User repository.

use std::sync::Arc;

use crate::entities::{User, user};
use crate::{db_error, write_error};
use devlink_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

const EMAIL_TAKEN: &str = "Email already registered";

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound("User not found".to_string()))
    }

    /// Find users by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Find a user by email. The lookup key is trimmed and lowercased.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| write_error(e, EMAIL_TAKEN))
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| write_error(e, EMAIL_TAKEN))
    }

    /// Delete a user. Connection requests cascade.
    pub async fn delete(&self, model: user::Model) -> AppResult<()> {
        model.delete(self.db.as_ref()).await.map_err(db_error)?;
        Ok(())
    }

    /// Newest-first page of users.
    pub async fn find_page(&self, offset: u64, limit: u64) -> AppResult<Vec<user::Model>> {
        User::find()
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Total number of users.
    pub async fn count(&self) -> AppResult<u64> {
        User::find().count(self.db.as_ref()).await.map_err(db_error)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::user::Gender;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_user(id: &str, email: &str) -> user::Model {
        let now = Utc::now().into();
        user::Model {
            id: id.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            age: 28,
            gender: Gender::Female,
            photo_url: "https://example.com/ada.png".to_string(),
            about: String::new(),
            skills: serde_json::json!(["rust"]),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let user = create_test_user("u1", "ada@example.com");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_id("u1").await.unwrap();

        assert_eq!(result.unwrap().email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_skips_query() {
        // No results appended: a query would fail.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = UserRepository::new(db);
        let result = repo.find_by_ids(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_email_normalizes_key() {
        let user = create_test_user("u1", "ada@example.com");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let repo = UserRepository::new(db.clone());
        let result = repo.find_by_email("  Ada@Example.COM ").await.unwrap();
        assert!(result.is_some());
        drop(repo);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let sql = format!("{log:?}");
        assert!(sql.contains("ada@example.com"));
    }

    #[test]
    fn test_skill_list_reads_json_array() {
        let mut user = create_test_user("u1", "ada@example.com");
        user.skills = serde_json::json!(["rust", 3, "go"]);
        assert_eq!(user.skill_list(), vec!["rust", "go"]);
    }
}
