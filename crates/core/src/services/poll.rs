//! Poll service.

use chrono::Utc;
use condovote_common::{AppError, AppResult, IdGenerator};
use condovote_db::entities::poll;
use condovote_db::repositories::{PollRepository, RoomRepository};
use sea_orm::{ActiveValue::NotSet, Set};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use validator::Validate;

use super::events::{EventPublisher, RoomEvent};

/// Maximum number of options per poll.
const MAX_OPTIONS: usize = 20;

/// Maximum option label length.
const MAX_OPTION_LEN: usize = 200;

/// Maximum question length.
const MAX_QUESTION_LEN: usize = 500;

/// Input for creating a poll.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollInput {
    pub room_id: String,
    #[validate(length(min = 1))]
    pub question: String,
    pub options: Vec<String>,
    #[serde(default = "default_true")]
    pub is_anonymous: bool,
}

fn default_true() -> bool {
    true
}

/// Service for managing polls.
#[derive(Clone)]
pub struct PollService {
    poll_repo: PollRepository,
    room_repo: RoomRepository,
    events: EventPublisher,
    id_gen: IdGenerator,
}

impl PollService {
    /// Create a new poll service.
    #[must_use]
    pub const fn new(
        poll_repo: PollRepository,
        room_repo: RoomRepository,
        events: EventPublisher,
    ) -> Self {
        Self {
            poll_repo,
            room_repo,
            events,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a poll by ID.
    pub async fn get(&self, poll_id: &str) -> AppResult<poll::Model> {
        self.poll_repo.get_by_id(poll_id).await
    }

    /// List a room's polls in creation order, optionally only open ones.
    pub async fn list_for_room(
        &self,
        room_id: &str,
        open_only: bool,
    ) -> AppResult<Vec<poll::Model>> {
        if open_only {
            self.poll_repo.find_open_by_room(room_id).await
        } else {
            self.poll_repo.find_by_room(room_id).await
        }
    }

    /// Create a poll under an open room.
    ///
    /// Option entries are trimmed and blank ones discarded before the
    /// minimum-count check; at least two distinct labels must remain. The
    /// option list is fixed forever after this call, since the option index
    /// is the only stable reference to an option.
    pub async fn create(&self, input: CreatePollInput) -> AppResult<poll::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let question = input.question.trim().to_string();
        if question.is_empty() {
            return Err(AppError::Validation("Question must not be blank".into()));
        }
        if question.len() > MAX_QUESTION_LEN {
            return Err(AppError::Validation(format!(
                "Question is too long (max {MAX_QUESTION_LEN} chars)"
            )));
        }

        let options = validate_options(&input.options)?;

        let room = self.room_repo.get_by_id(&input.room_id).await?;
        if !room.is_open() {
            return Err(AppError::RoomClosed);
        }

        let model = poll::ActiveModel {
            id: Set(self.id_gen.generate()),
            room_id: Set(room.id.clone()),
            question: Set(question),
            options: Set(json!(options)),
            status: Set(poll::PollStatus::Open),
            is_anonymous: Set(input.is_anonymous),
            created_at: NotSet,
            closed_at: Set(None),
        };

        let poll = self.poll_repo.create(model).await?;
        info!(poll_id = %poll.id, room_id = %poll.room_id, "Poll created");

        self.events
            .publish(
                &poll.room_id,
                RoomEvent::PollCreated {
                    poll_id: poll.id.clone(),
                },
            )
            .await;

        Ok(poll)
    }

    /// Close a poll. Terminal: a closed poll never reopens.
    pub async fn close(&self, poll_id: &str) -> AppResult<poll::Model> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;

        if !poll.is_open() {
            return Err(AppError::Conflict("Poll is already closed".into()));
        }

        let room_id = poll.room_id.clone();
        let mut active: poll::ActiveModel = poll.into();
        active.status = Set(poll::PollStatus::Closed);
        active.closed_at = Set(Some(Utc::now().into()));

        let poll = self.poll_repo.update(active).await?;
        info!(poll_id = %poll.id, "Poll closed");

        self.events
            .publish(
                &room_id,
                RoomEvent::PollClosed {
                    poll_id: poll.id.clone(),
                },
            )
            .await;

        Ok(poll)
    }

    /// Delete a poll. Destructive and irreversible; its votes cascade at
    /// the store rather than lingering as orphans.
    pub async fn delete(&self, poll_id: &str) -> AppResult<()> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;
        self.poll_repo.delete(poll_id).await?;
        info!(poll_id = %poll_id, "Poll deleted");

        self.events
            .publish(
                &poll.room_id,
                RoomEvent::PollDeleted {
                    poll_id: poll_id.to_string(),
                },
            )
            .await;

        Ok(())
    }
}

/// Trim option labels, discard blanks, and enforce the count, length, and
/// distinctness rules.
fn validate_options(raw: &[String]) -> AppResult<Vec<String>> {
    let options: Vec<String> = raw
        .iter()
        .map(|opt| opt.trim().to_string())
        .filter(|opt| !opt.is_empty())
        .collect();

    if options.len() < 2 {
        return Err(AppError::Validation(
            "Poll needs at least 2 non-empty options".into(),
        ));
    }
    if options.len() > MAX_OPTIONS {
        return Err(AppError::Validation(format!(
            "Poll cannot have more than {MAX_OPTIONS} options"
        )));
    }
    for option in &options {
        if option.len() > MAX_OPTION_LEN {
            return Err(AppError::Validation(format!(
                "Option is too long (max {MAX_OPTION_LEN} chars)"
            )));
        }
    }

    let mut seen = std::collections::HashSet::new();
    for option in &options {
        if !seen.insert(option.as_str()) {
            return Err(AppError::Validation(format!(
                "Duplicate option: {option}"
            )));
        }
    }

    Ok(options)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use condovote_db::entities::room;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_room(id: &str, open: bool) -> room::Model {
        room::Model {
            id: id.to_string(),
            name: "Assembly".to_string(),
            code: "AB12CD".to_string(),
            status: if open {
                room::RoomStatus::Open
            } else {
                room::RoomStatus::Closed
            },
            created_at: Utc::now().into(),
            closed_at: None,
        }
    }

    fn create_test_poll(id: &str, room_id: &str, open: bool) -> poll::Model {
        poll::Model {
            id: id.to_string(),
            room_id: room_id.to_string(),
            question: "Approve renovation?".to_string(),
            options: json!(["Yes", "No"]),
            status: if open {
                poll::PollStatus::Open
            } else {
                poll::PollStatus::Closed
            },
            is_anonymous: true,
            created_at: Utc::now().into(),
            closed_at: None,
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> PollService {
        let db = Arc::new(db);
        PollService::new(
            PollRepository::new(Arc::clone(&db)),
            RoomRepository::new(db),
            EventPublisher::new(),
        )
    }

    #[test]
    fn test_validate_options_discards_blanks() {
        // Only one non-empty option survives trimming
        let result = validate_options(&[String::new(), "  ".to_string(), "Yes".to_string()]);
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result =
            validate_options(&[" Yes ".to_string(), "No".to_string(), String::new()]).unwrap();
        assert_eq!(result, vec!["Yes", "No"]);
    }

    #[test]
    fn test_validate_options_rejects_duplicates() {
        let result = validate_options(&["Yes".to_string(), "Yes ".to_string()]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_closed_room() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_room("r1", false)]])
            .into_connection();

        let service = service_with(db);
        let result = service
            .create(CreatePollInput {
                room_id: "r1".to_string(),
                question: "Approve renovation?".to_string(),
                options: vec!["Yes".to_string(), "No".to_string()],
                is_anonymous: true,
            })
            .await;

        assert!(matches!(result, Err(AppError::RoomClosed)));
    }

    #[tokio::test]
    async fn test_create_in_open_room() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_room("r1", true)]])
            .append_query_results([[create_test_poll("p1", "r1", true)]])
            .into_connection();

        let service = service_with(db);
        let poll = service
            .create(CreatePollInput {
                room_id: "r1".to_string(),
                question: "Approve renovation?".to_string(),
                options: vec!["Yes".to_string(), "No".to_string()],
                is_anonymous: true,
            })
            .await
            .unwrap();

        assert!(poll.is_open());
        assert_eq!(poll.option_labels().unwrap(), vec!["Yes", "No"]);
    }

    #[tokio::test]
    async fn test_close_already_closed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_poll("p1", "r1", false)]])
            .into_connection();

        let service = service_with(db);
        let result = service.close("p1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
