//! Room service.

use chrono::Utc;
use condovote_common::{AppError, AppResult, Config, IdGenerator};
use condovote_db::entities::{participant, room};
use condovote_db::repositories::{ParticipantRepository, RoomRepository};
use sea_orm::{ActiveValue::NotSet, Set};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use super::events::{EventPublisher, RoomEvent};

/// Input for creating a room.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
}

/// Input for joining a room as a resident.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomInput {
    #[validate(length(min = 1, max = 16))]
    pub code: String,
    #[validate(length(min = 1, max = 32))]
    pub block: String,
    #[validate(length(min = 1, max = 32))]
    pub apartment: String,
}

/// Service for managing rooms and their participants.
#[derive(Clone)]
pub struct RoomService {
    room_repo: RoomRepository,
    participant_repo: ParticipantRepository,
    events: EventPublisher,
    id_gen: IdGenerator,
    code_length: usize,
    code_attempts: u32,
}

impl RoomService {
    /// Create a new room service.
    #[must_use]
    pub fn new(
        room_repo: RoomRepository,
        participant_repo: ParticipantRepository,
        events: EventPublisher,
        config: &Config,
    ) -> Self {
        Self {
            room_repo,
            participant_repo,
            events,
            id_gen: IdGenerator::new(),
            code_length: config.rooms.code_length,
            code_attempts: config.rooms.code_attempts,
        }
    }

    /// Get a room by ID.
    pub async fn get(&self, room_id: &str) -> AppResult<room::Model> {
        self.room_repo.get_by_id(room_id).await
    }

    /// List rooms, newest first.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<room::Model>> {
        self.room_repo.list(limit, offset).await
    }

    /// Create a new room with a freshly allocated join code.
    ///
    /// Code generation retries on collision against open rooms, bounded by
    /// the configured ceiling; past it the call fails loudly instead of
    /// reusing a code.
    pub async fn create(&self, input: CreateRoomInput) -> AppResult<room::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Room name must not be blank".into()));
        }

        let code = self.allocate_join_code().await?;

        let model = room::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            code: Set(code),
            status: Set(room::RoomStatus::Open),
            created_at: NotSet,
            closed_at: Set(None),
        };

        let room = self.room_repo.create(model).await?;
        info!(room_id = %room.id, code = %room.code, "Room created");
        Ok(room)
    }

    async fn allocate_join_code(&self) -> AppResult<String> {
        for _ in 0..self.code_attempts {
            let code = self.id_gen.generate_join_code(self.code_length);
            if !self.room_repo.code_in_use(&code).await? {
                return Ok(code);
            }
        }
        Err(AppError::Conflict(format!(
            "Could not allocate a unique join code after {} attempts",
            self.code_attempts
        )))
    }

    /// Enter a room as a resident, recording the entry in the audit trail.
    ///
    /// The join code is matched case-insensitively against open rooms; a
    /// code that only matches closed rooms reports the closure rather than
    /// a generic not-found.
    pub async fn join(
        &self,
        input: JoinRoomInput,
    ) -> AppResult<(room::Model, participant::Model)> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let block = input.block.trim().to_ascii_uppercase();
        let apartment = input.apartment.trim().to_string();
        if block.is_empty() || apartment.is_empty() {
            return Err(AppError::Validation(
                "Block and apartment must not be blank".into(),
            ));
        }

        let room = match self.room_repo.find_open_by_code(&input.code).await? {
            Some(room) => room,
            None => {
                // Distinguish a closed room from a mistyped code
                if self.room_repo.find_by_code(&input.code).await?.is_empty() {
                    return Err(AppError::RoomNotFound(input.code.clone()));
                }
                return Err(AppError::RoomClosed);
            }
        };

        let unit_id = format!("{block}-{apartment}");

        let model = participant::ActiveModel {
            id: Set(self.id_gen.generate()),
            room_id: Set(room.id.clone()),
            unit_id: Set(unit_id.clone()),
            block: Set(block),
            apartment: Set(apartment),
            joined_at: NotSet,
        };

        let participant = self.participant_repo.create(model).await?;
        info!(room_id = %room.id, unit_id = %unit_id, "Participant joined");

        self.events
            .publish(&room.id, RoomEvent::ParticipantJoined { unit_id })
            .await;

        Ok((room, participant))
    }

    /// The entry log for a room.
    pub async fn participants(&self, room_id: &str) -> AppResult<Vec<participant::Model>> {
        self.participant_repo.find_by_room(room_id).await
    }

    /// Close a room. Terminal: a closed room never reopens.
    pub async fn close(&self, room_id: &str) -> AppResult<room::Model> {
        let room = self.room_repo.get_by_id(room_id).await?;

        if !room.is_open() {
            return Err(AppError::Conflict("Room is already closed".into()));
        }

        let mut active: room::ActiveModel = room.into();
        active.status = Set(room::RoomStatus::Closed);
        active.closed_at = Set(Some(Utc::now().into()));

        let room = self.room_repo.update(active).await?;
        info!(room_id = %room.id, "Room closed");

        self.events.publish(room_id, RoomEvent::RoomClosed).await;
        Ok(room)
    }

    /// Delete a room. Destructive and irreversible: polls, votes, and
    /// participants cascade at the store, so no orphaned records remain.
    pub async fn delete(&self, room_id: &str) -> AppResult<()> {
        // Surface not-found before issuing the delete
        self.room_repo.get_by_id(room_id).await?;
        self.room_repo.delete(room_id).await?;
        info!(room_id = %room_id, "Room deleted");

        self.events.publish(room_id, RoomEvent::RoomDeleted).await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use condovote_common::config::{DatabaseConfig, RoomConfig, ServerConfig};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/test".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            rooms: RoomConfig::default(),
        }
    }

    fn create_test_room(id: &str, name: &str, code: &str, open: bool) -> room::Model {
        room::Model {
            id: id.to_string(),
            name: name.to_string(),
            code: code.to_string(),
            status: if open {
                room::RoomStatus::Open
            } else {
                room::RoomStatus::Closed
            },
            created_at: Utc::now().into(),
            closed_at: None,
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> RoomService {
        let db = Arc::new(db);
        RoomService::new(
            RoomRepository::new(Arc::clone(&db)),
            ParticipantRepository::new(db),
            EventPublisher::new(),
            &test_config(),
        )
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );

        let result = service
            .create(CreateRoomInput {
                name: "   ".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_generates_code_and_inserts() {
        let created = create_test_room("r1", "Assembly", "AB12CD", true);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // code_in_use: no collision
            .append_query_results([[maplit::btreemap! {
                "num_items" => sea_orm::Value::BigInt(Some(0))
            }]])
            .append_query_results([[created]])
            .into_connection();

        let service = service_with(db);
        let room = service
            .create(CreateRoomInput {
                name: "Assembly".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(room.code.len(), 6);
        assert!(room.is_open());
    }

    #[tokio::test]
    async fn test_create_fails_past_collision_ceiling() {
        // Every code probe reports a collision
        let collisions: Vec<Vec<std::collections::BTreeMap<&str, sea_orm::Value>>> = (0..8)
            .map(|_| {
                vec![maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(1))
                }]
            })
            .collect();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(collisions)
            .into_connection();

        let service = service_with(db);
        let result = service
            .create(CreateRoomInput {
                name: "Assembly".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_join_closed_room() {
        let closed = create_test_room("r1", "Assembly", "AB12CD", false);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // find_open_by_code: nothing open
            .append_query_results::<room::Model, _, _>([Vec::new()])
            // find_by_code: the closed room
            .append_query_results([[closed]])
            .into_connection();

        let service = service_with(db);
        let result = service
            .join(JoinRoomInput {
                code: "ab12cd".to_string(),
                block: "B".to_string(),
                apartment: "101".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::RoomClosed)));
    }

    #[tokio::test]
    async fn test_join_unknown_code() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<room::Model, _, _>([Vec::new()])
            .append_query_results::<room::Model, _, _>([Vec::new()])
            .into_connection();

        let service = service_with(db);
        let result = service
            .join(JoinRoomInput {
                code: "ZZZZZZ".to_string(),
                block: "B".to_string(),
                apartment: "101".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::RoomNotFound(_))));
    }

    #[tokio::test]
    async fn test_join_derives_unit_id() {
        let open = create_test_room("r1", "Assembly", "AB12CD", true);
        let participant = participant::Model {
            id: "pt1".to_string(),
            room_id: "r1".to_string(),
            unit_id: "B-101".to_string(),
            block: "B".to_string(),
            apartment: "101".to_string(),
            joined_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[open]])
            .append_query_results([[participant]])
            .into_connection();

        let service = service_with(db);
        let (room, participant) = service
            .join(JoinRoomInput {
                code: "AB12CD".to_string(),
                block: "b".to_string(),
                apartment: "101".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(room.id, "r1");
        assert_eq!(participant.unit_id, "B-101");
    }

    #[tokio::test]
    async fn test_close_already_closed() {
        let closed = create_test_room("r1", "Assembly", "AB12CD", false);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[closed]])
            .into_connection();

        let service = service_with(db);
        let result = service.close("r1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_room() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<room::Model, _, _>([Vec::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let service = service_with(db);
        let result = service.delete("missing").await;

        assert!(matches!(result, Err(AppError::RoomNotFound(_))));
    }
}
