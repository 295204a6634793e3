//! Room endpoints.

use axum::{Json, Router, extract::State, routing::post};
use condovote_common::AppResult;
use condovote_core::{CreateRoomInput, JoinRoomInput};
use condovote_db::entities::{participant, room};
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Room response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub id: String,
    pub name: String,
    pub code: String,
    pub status: room::RoomStatus,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,
}

impl From<room::Model> for RoomResponse {
    fn from(room: room::Model) -> Self {
        Self {
            id: room.id,
            name: room.name,
            code: room.code,
            status: room.status,
            created_at: room.created_at.to_rfc3339(),
            closed_at: room.closed_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Participant response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResponse {
    pub unit_id: String,
    pub block: String,
    pub apartment: String,
    pub joined_at: String,
}

impl From<participant::Model> for ParticipantResponse {
    fn from(p: participant::Model) -> Self {
        Self {
            unit_id: p.unit_id,
            block: p.block,
            apartment: p.apartment,
            joined_at: p.joined_at.to_rfc3339(),
        }
    }
}

/// Create a room.
async fn create_room(
    State(state): State<AppState>,
    Json(req): Json<CreateRoomInput>,
) -> AppResult<ApiResponse<RoomResponse>> {
    let room = state.room_service.create(req).await?;
    Ok(ApiResponse::ok(room.into()))
}

/// Show room request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowRoomRequest {
    pub room_id: String,
}

/// Get room details.
async fn show_room(
    State(state): State<AppState>,
    Json(req): Json<ShowRoomRequest>,
) -> AppResult<ApiResponse<RoomResponse>> {
    let room = state.room_service.get(&req.room_id).await?;
    Ok(ApiResponse::ok(room.into()))
}

/// List rooms request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRoomsRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    50
}

/// List rooms, newest first.
async fn list_rooms(
    State(state): State<AppState>,
    Json(req): Json<ListRoomsRequest>,
) -> AppResult<ApiResponse<Vec<RoomResponse>>> {
    let rooms = state
        .room_service
        .list(req.limit.min(100), req.offset)
        .await?;
    Ok(ApiResponse::ok(
        rooms.into_iter().map(Into::into).collect(),
    ))
}

/// Join room response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomResponse {
    pub room: RoomResponse,
    pub unit_id: String,
}

/// Enter a room with a join code and a block/apartment identity.
async fn join_room(
    State(state): State<AppState>,
    Json(req): Json<JoinRoomInput>,
) -> AppResult<ApiResponse<JoinRoomResponse>> {
    let (room, participant) = state.room_service.join(req).await?;
    Ok(ApiResponse::ok(JoinRoomResponse {
        room: room.into(),
        unit_id: participant.unit_id,
    }))
}

/// Close a room (terminal).
async fn close_room(
    State(state): State<AppState>,
    Json(req): Json<ShowRoomRequest>,
) -> AppResult<ApiResponse<RoomResponse>> {
    let room = state.room_service.close(&req.room_id).await?;
    Ok(ApiResponse::ok(room.into()))
}

/// Delete a room and everything under it.
async fn delete_room(
    State(state): State<AppState>,
    Json(req): Json<ShowRoomRequest>,
) -> AppResult<impl axum::response::IntoResponse> {
    state.room_service.delete(&req.room_id).await?;
    Ok(crate::response::ok())
}

/// The room's entry log.
async fn list_participants(
    State(state): State<AppState>,
    Json(req): Json<ShowRoomRequest>,
) -> AppResult<ApiResponse<Vec<ParticipantResponse>>> {
    let participants = state.room_service.participants(&req.room_id).await?;
    Ok(ApiResponse::ok(
        participants.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_room))
        .route("/show", post(show_room))
        .route("/list", post(list_rooms))
        .route("/join", post(join_room))
        .route("/close", post(close_room))
        .route("/delete", post(delete_room))
        .route("/participants", post(list_participants))
}
