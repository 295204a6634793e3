//! Poll entity - a single question with a fixed option list, owned by a room.

use condovote_common::{AppError, AppResult};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Poll status. Closing is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum PollStatus {
    /// Accepting votes.
    #[sea_orm(string_value = "open")]
    #[default]
    Open,
    /// Terminal state; no further votes are accepted.
    #[sea_orm(string_value = "closed")]
    Closed,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning room.
    #[sea_orm(indexed)]
    pub room_id: String,

    /// Question text.
    #[sea_orm(column_type = "Text")]
    pub question: String,

    /// Option labels (JSON array of strings). The list is fixed after
    /// creation; the option index is the only stable reference to an option.
    #[sea_orm(column_type = "JsonBinary")]
    pub options: JsonValue,

    pub status: PollStatus,

    /// Whether votes are recorded without a voter name.
    pub is_anonymous: bool,

    /// When the poll was created (server-assigned).
    pub created_at: DateTimeWithTimeZone,

    /// When the poll was closed.
    #[sea_orm(nullable)]
    pub closed_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Whether the poll still accepts votes.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == PollStatus::Open
    }

    /// Decode the option labels, rejecting malformed stored records rather
    /// than trusting them.
    pub fn option_labels(&self) -> AppResult<Vec<String>> {
        serde_json::from_value(self.options.clone())
            .map_err(|e| AppError::Internal(format!("Invalid poll options for {}: {e}", self.id)))
    }
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

    #[sea_orm(has_many = "super::vote::Entity")]
    Votes,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl Related<super::vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
