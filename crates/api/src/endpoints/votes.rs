//! Vote endpoints.

use axum::{Json, Router, extract::State, routing::post};
use condovote_common::AppResult;
use condovote_core::RecordVoteInput;
use condovote_db::entities::vote;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Vote response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub id: String,
    pub poll_id: String,
    pub room_id: String,
    pub unit_id: String,
    pub option_index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voter_name: Option<String>,
    pub created_at: String,
}

impl From<vote::Model> for VoteResponse {
    fn from(vote: vote::Model) -> Self {
        Self {
            id: vote.id,
            poll_id: vote.poll_id,
            room_id: vote.room_id,
            unit_id: vote.unit_id,
            option_index: vote.option_index,
            voter_name: vote.voter_name,
            created_at: vote.created_at.to_rfc3339(),
        }
    }
}

/// Cast a vote.
async fn cast_vote(
    State(state): State<AppState>,
    Json(req): Json<RecordVoteInput>,
) -> AppResult<ApiResponse<VoteResponse>> {
    let vote = state.vote_service.record(req).await?;
    Ok(ApiResponse::ok(vote.into()))
}

/// Eligibility request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityRequest {
    pub poll_id: String,
    pub unit_id: String,
}

/// Eligibility response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
    pub has_voted: bool,
}

/// Check whether a unit has already voted on a poll.
async fn eligibility(
    State(state): State<AppState>,
    Json(req): Json<EligibilityRequest>,
) -> AppResult<ApiResponse<EligibilityResponse>> {
    let has_voted = state
        .vote_service
        .has_voted(&req.poll_id, &req.unit_id)
        .await?;
    Ok(ApiResponse::ok(EligibilityResponse { has_voted }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cast", post(cast_vote))
        .route("/eligibility", post(eligibility))
}
