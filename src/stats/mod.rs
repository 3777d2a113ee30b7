mod errors;
pub mod handlers;
pub mod leaderboard;
pub mod models;
pub mod repository;
pub mod service;
mod streaks;

pub use errors::StatsError;
pub use leaderboard::{LeaderboardAction, LeaderboardBrowser, LeaderboardPage};
pub use models::*;
pub use repository::{InMemoryStatsRepository, PostgresStatsRepository, StatsRepository};
pub use service::StatsAggregator;
