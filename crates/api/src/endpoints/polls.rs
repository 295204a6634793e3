//! Poll endpoints.

use axum::{Json, Router, extract::State, routing::post};
use condovote_common::AppResult;
use condovote_core::CreatePollInput;
use condovote_db::entities::poll;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Poll response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub id: String,
    pub room_id: String,
    pub question: String,
    pub options: Vec<String>,
    pub status: poll::PollStatus,
    pub is_anonymous: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,
}

impl PollResponse {
    fn from_model(poll: poll::Model) -> AppResult<Self> {
        let options = poll.option_labels()?;
        Ok(Self {
            id: poll.id,
            room_id: poll.room_id,
            question: poll.question,
            options,
            status: poll.status,
            is_anonymous: poll.is_anonymous,
            created_at: poll.created_at.to_rfc3339(),
            closed_at: poll.closed_at.map(|t| t.to_rfc3339()),
        })
    }
}

/// Create a poll under an open room.
async fn create_poll(
    State(state): State<AppState>,
    Json(req): Json<CreatePollInput>,
) -> AppResult<ApiResponse<PollResponse>> {
    let poll = state.poll_service.create(req).await?;
    Ok(ApiResponse::ok(PollResponse::from_model(poll)?))
}

/// Show poll request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowPollRequest {
    pub poll_id: String,
}

/// Get poll details.
async fn show_poll(
    State(state): State<AppState>,
    Json(req): Json<ShowPollRequest>,
) -> AppResult<ApiResponse<PollResponse>> {
    let poll = state.poll_service.get(&req.poll_id).await?;
    Ok(ApiResponse::ok(PollResponse::from_model(poll)?))
}

/// List polls request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPollsRequest {
    pub room_id: String,
    #[serde(default)]
    pub open_only: bool,
}

/// List a room's polls in creation order.
async fn list_polls(
    State(state): State<AppState>,
    Json(req): Json<ListPollsRequest>,
) -> AppResult<ApiResponse<Vec<PollResponse>>> {
    let polls = state
        .poll_service
        .list_for_room(&req.room_id, req.open_only)
        .await?;
    let responses = polls
        .into_iter()
        .map(PollResponse::from_model)
        .collect::<AppResult<Vec<_>>>()?;
    Ok(ApiResponse::ok(responses))
}

/// Close a poll (terminal).
async fn close_poll(
    State(state): State<AppState>,
    Json(req): Json<ShowPollRequest>,
) -> AppResult<ApiResponse<PollResponse>> {
    let poll = state.poll_service.close(&req.poll_id).await?;
    Ok(ApiResponse::ok(PollResponse::from_model(poll)?))
}

/// Delete a poll and its votes.
async fn delete_poll(
    State(state): State<AppState>,
    Json(req): Json<ShowPollRequest>,
) -> AppResult<impl axum::response::IntoResponse> {
    state.poll_service.delete(&req.poll_id).await?;
    Ok(crate::response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_poll))
        .route("/show", post(show_poll))
        .route("/list", post(list_polls))
        .route("/close", post(close_poll))
        .route("/delete", post(delete_poll))
}
