//! Database repositories.

mod participant;
mod poll;
mod room;
mod vote;

pub use participant::ParticipantRepository;
pub use poll::PollRepository;
pub use room::RoomRepository;
pub use vote::VoteRepository;
