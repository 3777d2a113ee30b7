// Library crate for the GuessTheCraft game server
// This file exposes the public API for the binary and integration tests

pub mod catalog;
pub mod config;
pub mod grid;
pub mod render;
pub mod round;
pub mod session;
pub mod shared;
pub mod stats;
pub mod transport;
pub mod websockets;

use axum::{
    routing::{get, post},
    Router,
};

// Re-export commonly used types for easier access in tests
pub use catalog::{RecipeCatalog, RecipeSource};
pub use config::AppConfig;
pub use session::{SessionCoordinator, SessionSummary};
pub use shared::{AppError, AppState};
pub use stats::StatsAggregator;
pub use transport::{ChannelHub, Transport};

/// Every HTTP and WebSocket route of the server
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/games/solo", post(session::start_solo))
        .route("/games/duel", post(session::start_duel))
        .route("/games/room", post(session::start_room))
        .route(
            "/players/:player_id",
            get(stats::handlers::get_player_profile),
        )
        .route("/leaderboard", get(stats::handlers::get_leaderboard))
        .route("/ws/:channel_id", get(websockets::websocket_handler))
        .with_state(state)
}
