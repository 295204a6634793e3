//! Create participant table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Participant::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Participant::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Participant::RoomId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Participant::UnitId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Participant::Block).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Participant::Apartment)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Participant::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participant_room")
                            .from(Participant::Table, Participant::RoomId)
                            .to(Room::Table, Room::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index on room_id for the entry log
        manager
            .create_index(
                Index::create()
                    .name("idx_participant_room_id")
                    .table(Participant::Table)
                    .col(Participant::RoomId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Participant::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Participant {
    Table,
    Id,
    RoomId,
    UnitId,
    Block,
    Apartment,
    JoinedAt,
}

#[derive(Iden)]
enum Room {
    Table,
    Id,
}
