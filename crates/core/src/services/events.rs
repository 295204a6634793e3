//! Room event publishing.
//!
//! Per-room broadcast channels feeding live consumers (SSE streams, admin
//! dashboards). Subscriptions are explicit handles owning their receiver:
//! dropping or closing a [`RoomSubscription`] detaches it from the
//! publisher immediately, so teardown never depends on a stale closure
//! staying reachable.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{RwLock, broadcast};

/// Capacity of each per-room channel; slow consumers past this lag lose
/// the oldest events.
const ROOM_CHANNEL_CAPACITY: usize = 256;

/// Events emitted for a room.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RoomEvent {
    /// A poll was created in the room.
    PollCreated { poll_id: String },
    /// A poll stopped accepting votes.
    PollClosed { poll_id: String },
    /// A poll and its votes were deleted.
    PollDeleted { poll_id: String },
    /// A vote was recorded; results consumers should refresh the tally.
    VoteRecorded { poll_id: String },
    /// A resident entered the room.
    ParticipantJoined { unit_id: String },
    /// The room stopped accepting participants and votes.
    RoomClosed,
    /// The room and everything under it were deleted.
    RoomDeleted,
}

/// Publisher of per-room change feeds.
#[derive(Clone)]
pub struct EventPublisher {
    rooms: Arc<RwLock<HashMap<String, broadcast::Sender<RoomEvent>>>>,
}

impl EventPublisher {
    /// Create a new event publisher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Subscribe to a room's change feed.
    pub async fn subscribe(&self, room_id: &str) -> RoomSubscription {
        let mut rooms = self.rooms.write().await;

        let sender = if let Some(sender) = rooms.get(room_id) {
            sender.clone()
        } else {
            let (sender, _) = broadcast::channel(ROOM_CHANNEL_CAPACITY);
            rooms.insert(room_id.to_string(), sender.clone());
            sender
        };

        RoomSubscription {
            room_id: room_id.to_string(),
            receiver: sender.subscribe(),
        }
    }

    /// Publish an event to a room's feed. Dropped silently when nobody is
    /// listening.
    pub async fn publish(&self, room_id: &str, event: RoomEvent) {
        let rooms = self.rooms.read().await;
        if let Some(sender) = rooms.get(room_id) {
            let _ = sender.send(event);
        }
    }

    /// Prune channels whose subscribers have all gone away.
    pub async fn cleanup(&self) {
        let mut rooms = self.rooms.write().await;
        rooms.retain(|_, sender| sender.receiver_count() > 0);
    }

    /// Number of live subscribers for a room.
    pub async fn subscriber_count(&self, room_id: &str) -> usize {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).map_or(0, broadcast::Sender::receiver_count)
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// A live subscription to one room's change feed.
///
/// The handle owns the receiving end; dropping it (or calling [`close`])
/// tears the subscription down.
///
/// [`close`]: RoomSubscription::close
pub struct RoomSubscription {
    room_id: String,
    receiver: broadcast::Receiver<RoomEvent>,
}

impl RoomSubscription {
    /// The room this subscription watches.
    #[must_use]
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Receive the next event. Returns `None` once the publisher side is
    /// gone; events missed under lag are skipped, not fatal.
    pub async fn recv(&mut self) -> Option<RoomEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(room_id = %self.room_id, skipped, "Subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take the raw receiver, e.g. to adapt into a stream.
    #[must_use]
    pub fn into_receiver(self) -> broadcast::Receiver<RoomEvent> {
        self.receiver
    }

    /// Explicitly end the subscription.
    pub fn close(self) {
        drop(self);
    }
}
