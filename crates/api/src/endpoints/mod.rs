//! API endpoints.

mod polls;
mod results;
mod rooms;
mod votes;

use axum::Router;

use crate::middleware::AppState;
use crate::sse;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/rooms", rooms::router())
        .nest("/polls", polls::router())
        .nest("/votes", votes::router())
        .nest("/results", results::router())
        .nest("/stream", sse::router())
}
