//! Condovote server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use condovote_api::{middleware::AppState, router as api_router};
use condovote_common::Config;
use condovote_core::{EventPublisher, PollService, RoomService, TallyService, VoteService};
use condovote_db::repositories::{
    ParticipantRepository, PollRepository, RoomRepository, VoteRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "condovote=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting condovote server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = condovote_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    condovote_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let room_repo = RoomRepository::new(Arc::clone(&db));
    let participant_repo = ParticipantRepository::new(Arc::clone(&db));
    let poll_repo = PollRepository::new(Arc::clone(&db));
    let vote_repo = VoteRepository::new(Arc::clone(&db));

    // Initialize services
    let events = EventPublisher::new();
    let room_service = RoomService::new(
        room_repo.clone(),
        participant_repo,
        events.clone(),
        &config,
    );
    let poll_service = PollService::new(poll_repo.clone(), room_repo.clone(), events.clone());
    let vote_service = VoteService::new(
        vote_repo.clone(),
        poll_repo.clone(),
        room_repo,
        events.clone(),
    );
    let tally_service = TallyService::new(poll_repo, vote_repo);

    // Create app state
    let state = AppState {
        room_service,
        poll_service,
        vote_service,
        tally_service,
        events,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
