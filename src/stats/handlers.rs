use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::{
    leaderboard::LeaderboardPage,
    models::{LeaderboardMetric, PlayerStats, LEADERBOARD_PAGE_SIZE},
};
use crate::shared::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub metric: Option<LeaderboardMetric>,
    pub offset: Option<i64>,
}

/// Cumulative stats of one player
///
/// GET /players/:player_id
#[instrument(name = "get_player_profile", skip(state))]
pub async fn get_player_profile(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<PlayerStats>, AppError> {
    let stats = state
        .stats
        .player_stats(&player_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Player {} has no stats", player_id)))?;

    info!(player_id = %player_id, games = stats.total_games_played, "Profile fetched");
    Ok(Json(stats))
}

/// One page of the leaderboard
///
/// GET /leaderboard?metric=wins&offset=0
#[instrument(name = "get_leaderboard", skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardPage>, AppError> {
    let metric = query.metric.unwrap_or(LeaderboardMetric::Wins);
    let offset = query.offset.unwrap_or(0);
    if offset < 0 {
        return Err(AppError::BadRequest(
            "offset must not be negative".to_string(),
        ));
    }

    let entries = state.stats.leaderboard(offset, metric).await?;

    Ok(Json(LeaderboardPage {
        metric,
        title: metric.title().to_string(),
        offset,
        can_page_up: offset > 0,
        can_page_down: entries.len() as i64 == LEADERBOARD_PAGE_SIZE,
        entries,
    }))
}
