//! Create vote table.
//!
//! The unique index on `(poll_id, unit_id)` is the store-side enforcement
//! of the one-vote-per-unit-per-poll invariant.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vote::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vote::PollId).string_len(32).not_null())
                    .col(ColumnDef::new(Vote::RoomId).string_len(32).not_null())
                    .col(ColumnDef::new(Vote::UnitId).string_len(64).not_null())
                    .col(ColumnDef::new(Vote::OptionIndex).integer().not_null())
                    .col(ColumnDef::new(Vote::VoterName).string_len(128))
                    .col(
                        ColumnDef::new(Vote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_poll")
                            .from(Vote::Table, Vote::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_room")
                            .from(Vote::Table, Vote::RoomId)
                            .to(Room::Table, Room::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index on poll_id for tallying
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_poll_id")
                    .table(Vote::Table)
                    .col(Vote::PollId)
                    .to_owned(),
            )
            .await?;

        // Index on room_id for room-level queries
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_room_id")
                    .table(Vote::Table)
                    .col(Vote::RoomId)
                    .to_owned(),
            )
            .await?;

        // Unique constraint on (poll_id, unit_id): one vote per unit per poll
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_poll_unit_unique")
                    .table(Vote::Table)
                    .col(Vote::PollId)
                    .col(Vote::UnitId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Vote {
    Table,
    Id,
    PollId,
    RoomId,
    UnitId,
    OptionIndex,
    VoterName,
    CreatedAt,
}

#[derive(Iden)]
enum Poll {
    Table,
    Id,
}

#[derive(Iden)]
enum Room {
    Table,
    Id,
}
