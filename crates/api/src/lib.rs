//! HTTP API layer for condovote.
//!
//! This crate provides the REST surface over the voting ledger:
//!
//! - **Endpoints**: room, poll, vote, and result operations
//! - **Middleware**: shared application state
//! - **Streaming**: per-room Server-Sent Event change feeds
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod middleware;
pub mod response;
pub mod sse;

pub use endpoints::router;
