//! Create `connection_request` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ConnectionRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConnectionRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ConnectionRequest::FromUserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConnectionRequest::ToUserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConnectionRequest::PairKey)
                            .string_len(80)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConnectionRequest::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConnectionRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ConnectionRequest::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_connection_request_from_user")
                            .from(ConnectionRequest::Table, ConnectionRequest::FromUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_connection_request_to_user")
                            .from(ConnectionRequest::Table, ConnectionRequest::ToUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: pair_key - at most one edge per unordered pair
        manager
            .create_index(
                Index::create()
                    .name("idx_connection_request_pair_key")
                    .table(ConnectionRequest::Table)
                    .col(ConnectionRequest::PairKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (to_user_id, status) for the received-requests inbox
        manager
            .create_index(
                Index::create()
                    .name("idx_connection_request_to_user_status")
                    .table(ConnectionRequest::Table)
                    .col(ConnectionRequest::ToUserId)
                    .col(ConnectionRequest::Status)
                    .to_owned(),
            )
            .await?;

        // Index: (from_user_id, status) for the connections list
        manager
            .create_index(
                Index::create()
                    .name("idx_connection_request_from_user_status")
                    .table(ConnectionRequest::Table)
                    .col(ConnectionRequest::FromUserId)
                    .col(ConnectionRequest::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ConnectionRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ConnectionRequest {
    Table,
    Id,
    FromUserId,
    ToUserId,
    PairKey,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
