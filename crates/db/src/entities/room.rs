//! Room entity - an administrator-created voting session container.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Room status. Closing is terminal; there is no transition back to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum RoomStatus {
    /// Residents may join and vote.
    #[sea_orm(string_value = "open")]
    #[default]
    Open,
    /// Terminal state set by the administrator.
    #[sea_orm(string_value = "closed")]
    Closed,
}

/// Room entity - entered by residents via its join code.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "room")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Display name shown to participants.
    pub name: String,

    /// Join code, stored uppercase. Unique among open rooms; comparison is
    /// case-insensitive.
    #[sea_orm(indexed)]
    pub code: String,

    pub status: RoomStatus,

    /// When the room was created (server-assigned).
    pub created_at: DateTimeWithTimeZone,

    /// When the room was closed.
    #[sea_orm(nullable)]
    pub closed_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Whether the room still accepts participants and votes.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == RoomStatus::Open
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::poll::Entity")]
    Polls,
    #[sea_orm(has_many = "super::participant::Entity")]
    Participants,
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Polls.def()
    }
}

impl Related<super::participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
