//! Test utilities for database operations.
//!
//! Stateful tests run against an in-memory SQLite database with the full
//! migration set applied. The SQLite driver is enabled by the `test-utils`
//! feature.

use crate::entities::user::{self, Gender};
use crate::migrations::Migrator;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, DbErr, Set,
};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tracing::info;

/// In-memory database URL.
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// A migrated test database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: Arc<DatabaseConnection>,
}

impl TestDatabase {
    /// Create a fresh in-memory database and run all migrations.
    ///
    /// The pool is pinned to a single connection: every SQLite in-memory
    /// connection is its own database.
    pub async fn in_memory() -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new(IN_MEMORY_URL);
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Migrator::up(&conn, None).await?;

        info!("Created in-memory test database");

        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Get the database connection.
    #[must_use]
    pub const fn connection(&self) -> &Arc<DatabaseConnection> {
        &self.conn
    }

    /// Insert a user with placeholder profile fields.
    ///
    /// The password hash is not a real hash; use the identity service when
    /// a test needs to log in.
    pub async fn seed_user(
        &self,
        id: &str,
        first_name: &str,
        email: &str,
    ) -> Result<user::Model, DbErr> {
        let now = Utc::now().into();
        user::ActiveModel {
            id: Set(id.to_string()),
            email: Set(email.to_lowercase()),
            password_hash: Set("$argon2id$v=19$m=19456,t=2,p=1$seed$seed".to_string()),
            first_name: Set(first_name.to_string()),
            last_name: Set("Tester".to_string()),
            age: Set(25),
            gender: Set(Gender::Other),
            photo_url: Set("https://example.com/photo.png".to_string()),
            about: Set(String::new()),
            skills: Set(serde_json::json!([])),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.conn.as_ref())
        .await
    }
}
