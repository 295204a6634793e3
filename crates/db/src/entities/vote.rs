//! Vote entity - one unit's choice on one poll.
//!
//! A unique index on `(poll_id, unit_id)` enforces the one-vote-per-unit
//! invariant at the store; inserts racing past the eligibility pre-check
//! lose with a unique-violation error. Votes are immutable once written.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Poll this vote belongs to.
    #[sea_orm(indexed)]
    pub poll_id: String,

    /// Owning room (denormalized for query convenience).
    #[sea_orm(indexed)]
    pub room_id: String,

    /// Voting identity, derived from block + apartment (e.g. "B-101").
    #[sea_orm(indexed)]
    pub unit_id: String,

    /// Chosen option index (0-based) into the poll's option list.
    pub option_index: i32,

    /// Voter display name. Null when the poll is anonymous, required
    /// otherwise.
    #[sea_orm(nullable)]
    pub voter_name: Option<String>,

    /// When the vote was recorded (server-assigned, never a client clock).
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::poll::Entity",
        from = "Column::PollId",
        to = "super::poll::Column::Id",
        on_delete = "Cascade"
    )]
    Poll,

    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id",
        on_delete = "Cascade"
    )]
    Room,
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
