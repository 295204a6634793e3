//! Participant entity - audit trail of room entries.
//!
//! Not consulted for vote eligibility; that is always computed from Vote
//! records.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "participant")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Room the participant entered.
    #[sea_orm(indexed)]
    pub room_id: String,

    /// Voting identity, derived from block + apartment.
    #[sea_orm(indexed)]
    pub unit_id: String,

    /// Block identifier, stored uppercase.
    pub block: String,

    /// Apartment number as typed.
    pub apartment: String,

    /// When the participant entered the room (server-assigned).
    pub joined_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id",
        on_delete = "Cascade"
    )]
    Room,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
