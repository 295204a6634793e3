//! Participant repository.

use std::sync::Arc;

use condovote_common::AppResult;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder,
};

use crate::entities::{Participant, participant};

/// Participant repository for database operations.
#[derive(Clone)]
pub struct ParticipantRepository {
    db: Arc<DatabaseConnection>,
}

impl ParticipantRepository {
    /// Create a new participant repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Record a room entry.
    pub async fn create(&self, model: participant::ActiveModel) -> AppResult<participant::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Get the entry log for a room, oldest first.
    pub async fn find_by_room(&self, room_id: &str) -> AppResult<Vec<participant::Model>> {
        Participant::find()
            .filter(participant::Column::RoomId.eq(room_id))
            .order_by(participant::Column::JoinedAt, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Count entries for a room.
    pub async fn count_by_room(&self, room_id: &str) -> AppResult<u64> {
        Participant::find()
            .filter(participant::Column::RoomId.eq(room_id))
            .count(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }
}
