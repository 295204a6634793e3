//! Server-Sent Events (SSE) for live room updates.
//!
//! Each connection holds one [`condovote_core::RoomSubscription`]; when the
//! client goes away axum drops the stream and the subscription with it, so
//! the publisher sheds the receiver immediately.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::stream::{self, Stream};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::middleware::AppState;

/// Live change feed for one room.
async fn room_stream(
    Path(room_id): Path<String>,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.events.subscribe(&room_id).await;
    let rx = subscription.into_receiver();

    let stream = BroadcastStream::new(rx).filter_map(|result| {
        result.ok().map(|event| {
            Ok(Event::default()
                .json_data(&event)
                .unwrap_or_else(|_| Event::default().data("error")))
        })
    });

    // Add initial connected event
    let initial = stream::once(async { Ok(Event::default().event("connected").data("ok")) });

    Sse::new(initial.chain(stream)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}

/// Create SSE router.
pub fn router() -> Router<AppState> {
    Router::new().route("/rooms/{room_id}", get(room_stream))
}
