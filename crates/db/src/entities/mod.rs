//! Database entities.
//!
//! Explicit schemas for the records held in the store; rows are validated
//! against these shapes on read instead of being trusted.

pub mod participant;
pub mod poll;
pub mod room;
pub mod vote;

pub use participant::Entity as Participant;
pub use poll::Entity as Poll;
pub use room::Entity as Room;
pub use vote::Entity as Vote;
