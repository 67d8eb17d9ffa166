//! Database layer for devlink.

pub mod entities;
pub mod migrations;
pub mod repositories;
pub mod test_utils;

use devlink_common::{AppError, Config};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;
use tracing::log::LevelFilter;

/// Initialize database connection.
pub async fn init(config: &Config) -> Result<DatabaseConnection, AppError> {
    let mut opt = ConnectOptions::new(&config.database.url);

    opt.max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    Database::connect(opt).await.map_err(db_error)
}

/// Run pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
    use sea_orm_migration::MigratorTrait;
    migrations::Migrator::up(db, None).await.map_err(db_error)
}

/// Map a database error to [`AppError::Database`].
#[must_use]
pub fn db_error(err: DbErr) -> AppError {
    AppError::Database(err.to_string())
}

/// Map an insert/update error, translating constraint violations.
///
/// Unique violations become [`AppError::Conflict`] carrying `conflict`,
/// foreign-key violations become [`AppError::BadRequest`].
#[must_use]
pub fn write_error(err: DbErr, conflict: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(conflict.to_string()),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::BadRequest("Referenced user does not exist".to_string())
        }
        _ => db_error(err),
    }
}
