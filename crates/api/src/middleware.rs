//! API middleware and shared state.

#![allow(missing_docs)]

use condovote_core::{EventPublisher, PollService, RoomService, TallyService, VoteService};

/// Application state.
///
/// Administrator authentication is out of scope for this service; the
/// surrounding deployment fronts the admin routes as it sees fit.
#[derive(Clone)]
pub struct AppState {
    pub room_service: RoomService,
    pub poll_service: PollService,
    pub vote_service: VoteService,
    pub tally_service: TallyService,
    pub events: EventPublisher,
}
