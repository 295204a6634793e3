//! Create room table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Room::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Room::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Room::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Room::Code).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Room::Status)
                            .string_len(16)
                            .not_null()
                            .default("open"),
                    )
                    .col(
                        ColumnDef::new(Room::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Room::ClosedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index on code for join-code lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_room_code")
                    .table(Room::Table)
                    .col(Room::Code)
                    .to_owned(),
            )
            .await?;

        // Index on status for filtering open rooms
        manager
            .create_index(
                Index::create()
                    .name("idx_room_status")
                    .table(Room::Table)
                    .col(Room::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Room::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Room {
    Table,
    Id,
    Name,
    Code,
    Status,
    CreatedAt,
    ClosedAt,
}
