//! Result endpoints.

use axum::{Json, Router, extract::State, routing::post};
use condovote_common::AppResult;
use condovote_core::{Ballot, TallyResult};
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Results request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsRequest {
    pub poll_id: String,
}

/// Results response: the tally plus the poll's headline fields.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsResponse {
    pub poll_id: String,
    pub question: String,
    pub is_anonymous: bool,
    #[serde(flatten)]
    pub tally: TallyResult,
}

/// Per-option counts and percentages for a poll.
async fn show_results(
    State(state): State<AppState>,
    Json(req): Json<ResultsRequest>,
) -> AppResult<ApiResponse<ResultsResponse>> {
    let poll = state.poll_service.get(&req.poll_id).await?;
    let tally = state.tally_service.tally(&req.poll_id).await?;

    Ok(ApiResponse::ok(ResultsResponse {
        poll_id: poll.id,
        question: poll.question,
        is_anonymous: poll.is_anonymous,
        tally,
    }))
}

/// The voter roll of a non-anonymous poll.
async fn show_ballots(
    State(state): State<AppState>,
    Json(req): Json<ResultsRequest>,
) -> AppResult<ApiResponse<Vec<Ballot>>> {
    let ballots = state.tally_service.ballots(&req.poll_id).await?;
    Ok(ApiResponse::ok(ballots))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/show", post(show_results))
        .route("/ballots", post(show_ballots))
}
