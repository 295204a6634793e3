//! Business services.

pub mod events;
pub mod poll;
pub mod room;
pub mod tally;
pub mod vote;

pub use events::{EventPublisher, RoomEvent, RoomSubscription};
pub use poll::{CreatePollInput, PollService};
pub use room::{CreateRoomInput, JoinRoomInput, RoomService};
pub use tally::{Ballot, OptionTally, TallyResult, TallyService};
pub use vote::{RecordVoteInput, VoteService};
