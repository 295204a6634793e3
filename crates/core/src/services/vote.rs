//! Vote service: eligibility checks and vote recording.

use condovote_common::{AppError, AppResult, IdGenerator};
use condovote_db::entities::vote;
use condovote_db::repositories::{PollRepository, RoomRepository, VoteRepository};
use sea_orm::{ActiveValue::NotSet, Set};
use serde::Deserialize;
use tracing::info;

use super::events::{EventPublisher, RoomEvent};

/// Input for recording a vote.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordVoteInput {
    pub poll_id: String,
    pub unit_id: String,
    pub option_index: i32,
    #[serde(default)]
    pub voter_name: Option<String>,
}

/// Service for vote eligibility and recording.
#[derive(Clone)]
pub struct VoteService {
    vote_repo: VoteRepository,
    poll_repo: PollRepository,
    room_repo: RoomRepository,
    events: EventPublisher,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(
        vote_repo: VoteRepository,
        poll_repo: PollRepository,
        room_repo: RoomRepository,
        events: EventPublisher,
    ) -> Self {
        Self {
            vote_repo,
            poll_repo,
            room_repo,
            events,
            id_gen: IdGenerator::new(),
        }
    }

    /// Whether a unit has already voted on a poll.
    ///
    /// Read-only; absence of votes is not an error, only transport
    /// failures are.
    pub async fn has_voted(&self, poll_id: &str, unit_id: &str) -> AppResult<bool> {
        if poll_id.trim().is_empty() || unit_id.trim().is_empty() {
            return Err(AppError::Validation(
                "Poll and unit identifiers must not be blank".into(),
            ));
        }
        self.vote_repo.has_voted(poll_id, unit_id).await
    }

    /// Record a vote.
    ///
    /// Validates poll and room state, the option index, and the voter-name
    /// rule for the poll's anonymity mode, then appends through a single
    /// conditional create. The eligibility pre-check is a courtesy for the
    /// common path; the store's unique `(poll_id, unit_id)` index settles
    /// concurrent double submits, with the loser surfacing `AlreadyVoted`.
    pub async fn record(&self, input: RecordVoteInput) -> AppResult<vote::Model> {
        if input.poll_id.trim().is_empty() || input.unit_id.trim().is_empty() {
            return Err(AppError::Validation(
                "Poll and unit identifiers must not be blank".into(),
            ));
        }

        let poll = self.poll_repo.get_by_id(&input.poll_id).await?;

        let room = self.room_repo.get_by_id(&poll.room_id).await?;
        if !room.is_open() {
            return Err(AppError::RoomClosed);
        }
        if !poll.is_open() {
            return Err(AppError::PollClosed);
        }

        let options = poll.option_labels()?;
        let option_count = i32::try_from(options.len())
            .map_err(|_| AppError::Internal("Option list too large".into()))?;
        if input.option_index < 0 || input.option_index >= option_count {
            return Err(AppError::InvalidOption(format!(
                "Index {} out of range for {} options",
                input.option_index,
                options.len()
            )));
        }

        // Normalize the name: an all-whitespace entry counts as absent
        let voter_name = input
            .voter_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToString::to_string);

        if poll.is_anonymous {
            if voter_name.is_some() {
                return Err(AppError::UnexpectedVoterName);
            }
        } else if voter_name.is_none() {
            return Err(AppError::MissingVoterName);
        }

        if self
            .vote_repo
            .has_voted(&input.poll_id, &input.unit_id)
            .await?
        {
            return Err(AppError::AlreadyVoted);
        }

        let model = vote::ActiveModel {
            id: Set(self.id_gen.generate()),
            poll_id: Set(poll.id.clone()),
            room_id: Set(poll.room_id.clone()),
            unit_id: Set(input.unit_id.clone()),
            option_index: Set(input.option_index),
            voter_name: Set(voter_name),
            // Server-assigned; a client clock must never order votes
            created_at: NotSet,
        };

        let vote = self.vote_repo.create(model).await?;
        info!(
            poll_id = %vote.poll_id,
            unit_id = %vote.unit_id,
            option_index = vote.option_index,
            "Vote recorded"
        );

        self.events
            .publish(
                &vote.room_id,
                RoomEvent::VoteRecorded {
                    poll_id: vote.poll_id.clone(),
                },
            )
            .await;

        Ok(vote)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use condovote_db::entities::{poll, room};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
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

    fn create_test_poll(id: &str, room_id: &str, open: bool, anonymous: bool) -> poll::Model {
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
            is_anonymous: anonymous,
            created_at: Utc::now().into(),
            closed_at: None,
        }
    }

    fn create_test_vote(id: &str, poll_id: &str, unit_id: &str, option: i32) -> vote::Model {
        vote::Model {
            id: id.to_string(),
            poll_id: poll_id.to_string(),
            room_id: "r1".to_string(),
            unit_id: unit_id.to_string(),
            option_index: option,
            voter_name: None,
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> VoteService {
        let db = Arc::new(db);
        VoteService::new(
            VoteRepository::new(Arc::clone(&db)),
            PollRepository::new(Arc::clone(&db)),
            RoomRepository::new(db),
            EventPublisher::new(),
        )
    }

    fn count_result(n: i64) -> Vec<std::collections::BTreeMap<&'static str, sea_orm::Value>> {
        vec![maplit::btreemap! {
            "num_items" => sea_orm::Value::BigInt(Some(n))
        }]
    }

    #[tokio::test]
    async fn test_record_happy_path() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_poll("p1", "r1", true, true)]])
            .append_query_results([[create_test_room("r1", true)]])
            .append_query_results([count_result(0)])
            .append_query_results([[create_test_vote("v1", "p1", "A-101", 0)]])
            .into_connection();

        let service = service_with(db);
        let vote = service
            .record(RecordVoteInput {
                poll_id: "p1".to_string(),
                unit_id: "A-101".to_string(),
                option_index: 0,
                voter_name: None,
            })
            .await
            .unwrap();

        assert_eq!(vote.unit_id, "A-101");
        assert_eq!(vote.option_index, 0);
    }

    #[tokio::test]
    async fn test_record_already_voted() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_poll("p1", "r1", true, true)]])
            .append_query_results([[create_test_room("r1", true)]])
            .append_query_results([count_result(1)])
            .into_connection();

        let service = service_with(db);
        let result = service
            .record(RecordVoteInput {
                poll_id: "p1".to_string(),
                unit_id: "A-101".to_string(),
                option_index: 1,
                voter_name: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::AlreadyVoted)));
    }

    #[tokio::test]
    async fn test_record_closed_poll_before_eligibility() {
        // No count result is mocked: a closed poll must fail before the
        // eligibility query is ever issued
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_poll("p1", "r1", false, true)]])
            .append_query_results([[create_test_room("r1", true)]])
            .into_connection();

        let service = service_with(db);
        let result = service
            .record(RecordVoteInput {
                poll_id: "p1".to_string(),
                unit_id: "A-101".to_string(),
                option_index: 0,
                voter_name: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::PollClosed)));
    }

    #[tokio::test]
    async fn test_record_closed_room() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_poll("p1", "r1", true, true)]])
            .append_query_results([[create_test_room("r1", false)]])
            .into_connection();

        let service = service_with(db);
        let result = service
            .record(RecordVoteInput {
                poll_id: "p1".to_string(),
                unit_id: "A-101".to_string(),
                option_index: 0,
                voter_name: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::RoomClosed)));
    }

    #[tokio::test]
    async fn test_record_invalid_option() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_poll("p1", "r1", true, true)]])
            .append_query_results([[create_test_room("r1", true)]])
            .into_connection();

        let service = service_with(db);
        let result = service
            .record(RecordVoteInput {
                poll_id: "p1".to_string(),
                unit_id: "A-101".to_string(),
                option_index: 2,
                voter_name: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::InvalidOption(_))));
    }

    #[tokio::test]
    async fn test_record_missing_voter_name() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_poll("p1", "r1", true, false)]])
            .append_query_results([[create_test_room("r1", true)]])
            .into_connection();

        let service = service_with(db);
        let result = service
            .record(RecordVoteInput {
                poll_id: "p1".to_string(),
                unit_id: "A-101".to_string(),
                option_index: 0,
                voter_name: Some("   ".to_string()),
            })
            .await;

        assert!(matches!(result, Err(AppError::MissingVoterName)));
    }

    #[tokio::test]
    async fn test_record_unexpected_voter_name() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_poll("p1", "r1", true, true)]])
            .append_query_results([[create_test_room("r1", true)]])
            .into_connection();

        let service = service_with(db);
        let result = service
            .record(RecordVoteInput {
                poll_id: "p1".to_string(),
                unit_id: "A-101".to_string(),
                option_index: 0,
                voter_name: Some("Maria".to_string()),
            })
            .await;

        assert!(matches!(result, Err(AppError::UnexpectedVoterName)));
    }

    #[tokio::test]
    async fn test_record_named_vote() {
        let named = vote::Model {
            voter_name: Some("Maria".to_string()),
            ..create_test_vote("v1", "p1", "A-101", 1)
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_poll("p1", "r1", true, false)]])
            .append_query_results([[create_test_room("r1", true)]])
            .append_query_results([count_result(0)])
            .append_query_results([[named]])
            .into_connection();

        let service = service_with(db);
        let vote = service
            .record(RecordVoteInput {
                poll_id: "p1".to_string(),
                unit_id: "A-101".to_string(),
                option_index: 1,
                voter_name: Some(" Maria ".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(vote.voter_name.as_deref(), Some("Maria"));
    }

    #[tokio::test]
    async fn test_has_voted_rejects_blank_ids() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );

        let result = service.has_voted("", "A-101").await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = service.has_voted("p1", "  ").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
