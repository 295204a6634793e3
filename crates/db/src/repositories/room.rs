//! Room repository.

use std::sync::Arc;

use condovote_common::{AppError, AppResult, normalize_join_code};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use crate::entities::{Room, room};

/// Repository for room operations.
#[derive(Clone)]
pub struct RoomRepository {
    db: Arc<DatabaseConnection>,
}

impl RoomRepository {
    /// Create a new room repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find room by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<room::Model>> {
        Room::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Get room by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<room::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::RoomNotFound(id.to_string()))
    }

    /// Find an open room by join code. Comparison is case-insensitive:
    /// codes are stored uppercase and the query is normalized the same way.
    pub async fn find_open_by_code(&self, code: &str) -> AppResult<Option<room::Model>> {
        Room::find()
            .filter(room::Column::Code.eq(normalize_join_code(code)))
            .filter(room::Column::Status.eq(room::RoomStatus::Open))
            .one(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Find all rooms carrying a join code, any status. Used to tell a
    /// closed room apart from a nonexistent one when a resident joins.
    pub async fn find_by_code(&self, code: &str) -> AppResult<Vec<room::Model>> {
        Room::find()
            .filter(room::Column::Code.eq(normalize_join_code(code)))
            .all(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Whether an open room with this code already exists.
    pub async fn code_in_use(&self, code: &str) -> AppResult<bool> {
        let count = Room::find()
            .filter(room::Column::Code.eq(normalize_join_code(code)))
            .filter(room::Column::Status.eq(room::RoomStatus::Open))
            .count(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)?;
        Ok(count > 0)
    }

    /// List rooms, newest first.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<room::Model>> {
        Room::find()
            .order_by(room::Column::CreatedAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Create a new room.
    pub async fn create(&self, model: room::ActiveModel) -> AppResult<room::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Update a room.
    pub async fn update(&self, model: room::ActiveModel) -> AppResult<room::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Delete a room. Polls, votes, and participants cascade at the store.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Room::delete_by_id(id)
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
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_room(id: &str, name: &str, code: &str) -> room::Model {
        room::Model {
            id: id.to_string(),
            name: name.to_string(),
            code: code.to_string(),
            status: room::RoomStatus::Open,
            created_at: Utc::now().into(),
            closed_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let room = create_test_room("r1", "Assembly", "AB12CD");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[room.clone()]])
                .into_connection(),
        );

        let repo = RoomRepository::new(db);
        let result = repo.find_by_id("r1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().name, "Assembly");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results::<room::Model, _, _>([Vec::new()])
                .into_connection(),
        );

        let repo = RoomRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::RoomNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_open_by_code() {
        let room = create_test_room("r1", "Assembly", "AB12CD");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[room.clone()]])
                .into_connection(),
        );

        let repo = RoomRepository::new(db);
        let result = repo.find_open_by_code("ab12cd").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().code, "AB12CD");
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = RoomRepository::new(db);
        let result = repo.delete("r1").await;

        assert!(result.is_ok());
    }
}
