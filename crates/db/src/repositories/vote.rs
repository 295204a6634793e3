//! Vote repository.
//!
//! The insert path is the enforcement point for the one-vote-per-unit
//! invariant: the store's unique index on `(poll_id, unit_id)` makes the
//! append conditional, and the losing side of a concurrent double submit
//! surfaces as [`AppError::AlreadyVoted`].

use std::sync::Arc;

use condovote_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, SqlErr,
};

use crate::entities::{Vote, vote};

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check whether a unit has voted on a poll. Both filters are applied
    /// server-side; absence of rows is not an error.
    pub async fn has_voted(&self, poll_id: &str, unit_id: &str) -> AppResult<bool> {
        let count = Vote::find()
            .filter(vote::Column::PollId.eq(poll_id))
            .filter(vote::Column::UnitId.eq(unit_id))
            .count(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)?;
        Ok(count > 0)
    }

    /// Append a vote via a single conditional create. A unique-index
    /// violation on `(poll_id, unit_id)` means another vote for the same
    /// unit won the race.
    pub async fn create(&self, model: vote::ActiveModel) -> AppResult<vote::Model> {
        match model.insert(self.db.as_ref()).await {
            Ok(vote) => Ok(vote),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(AppError::AlreadyVoted),
                _ => Err(crate::map_db_err(e)),
            },
        }
    }

    /// Get all votes for a poll, in recording order.
    pub async fn find_by_poll(&self, poll_id: &str) -> AppResult<Vec<vote::Model>> {
        Vote::find()
            .filter(vote::Column::PollId.eq(poll_id))
            .order_by(vote::Column::CreatedAt, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }

    /// Count votes for a poll.
    pub async fn count_by_poll(&self, poll_id: &str) -> AppResult<u64> {
        Vote::find()
            .filter(vote::Column::PollId.eq(poll_id))
            .count(self.db.as_ref())
            .await
            .map_err(crate::map_db_err)
    }
}
