//! Poll repository.

use std::sync::Arc;

use condovote_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder,
};

use crate::entities::{Poll, poll};

/// Poll repository for database operations.
#[derive(Clone)]
pub struct PollRepository {
    db: Arc<DatabaseConnection>,
}

impl PollRepository {
    /// Create a new poll repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a poll by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<poll::Model>> {
        Poll::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Get a poll by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<poll::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PollNotFound(id.to_string()))
    }

    /// Find polls for a room, in creation order.
    pub async fn find_by_room(&self, room_id: &str) -> AppResult<Vec<poll::Model>> {
        Poll::find()
            .filter(poll::Column::RoomId.eq(room_id))
            .order_by(poll::Column::CreatedAt, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Find open polls for a room, in creation order.
    pub async fn find_open_by_room(&self, room_id: &str) -> AppResult<Vec<poll::Model>> {
        Poll::find()
            .filter(poll::Column::RoomId.eq(room_id))
            .filter(poll::Column::Status.eq(poll::PollStatus::Open))
            .order_by(poll::Column::CreatedAt, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Create a new poll.
    pub async fn create(&self, model: poll::ActiveModel) -> AppResult<poll::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Update a poll.
    pub async fn update(&self, model: poll::ActiveModel) -> AppResult<poll::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Delete a poll. Its votes cascade at the store.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Poll::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    fn create_test_poll(id: &str, room_id: &str, question: &str) -> poll::Model {
        poll::Model {
            id: id.to_string(),
            room_id: room_id.to_string(),
            question: question.to_string(),
            options: json!(["Yes", "No"]),
            status: poll::PollStatus::Open,
            is_anonymous: true,
            created_at: Utc::now().into(),
            closed_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results::<poll::Model, _, _>([Vec::new()])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::PollNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_room() {
        let p1 = create_test_poll("p1", "r1", "Approve renovation?");
        let p2 = create_test_poll("p2", "r1", "New gate?");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p1, p2]])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        let result = repo.find_by_room("r1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].question, "Approve renovation?");
    }

    #[test]
    fn test_option_labels_rejects_malformed() {
        let mut poll = create_test_poll("p1", "r1", "Approve?");
        poll.options = json!({"not": "an array"});

        assert!(poll.option_labels().is_err());
    }
}
