use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{
    LeaderboardEntry, LeaderboardMetric, PlayerStats, StatsUpsert, StreakCounters, StreakScope,
    LEADERBOARD_PAGE_SIZE,
};
use super::StatsError;

/// Durable store of cumulative player statistics
///
/// Every write is a single upsert keyed by player id; implementations must make
/// it atomic for the row it touches.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Inserts the player with zeroed stats, or refreshes the username
    async fn ensure_player(&self, player_id: &str, username: &str) -> Result<(), StatsError>;

    async fn get_streak_state(
        &self,
        player_id: &str,
        scope: StreakScope,
    ) -> Result<Option<StreakCounters>, StatsError>;

    async fn upsert_stats(
        &self,
        player_id: &str,
        username: &str,
        upsert: &StatsUpsert,
    ) -> Result<(), StatsError>;

    async fn get_player_stats(&self, player_id: &str) -> Result<Option<PlayerStats>, StatsError>;

    /// One page of players ranked by `metric`, best first
    async fn get_leaderboard(
        &self,
        offset: i64,
        metric: LeaderboardMetric,
    ) -> Result<Vec<LeaderboardEntry>, StatsError>;
}

/// In-memory implementation for development and tests. Data is lost on restart.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStatsRepository {
    players: Arc<RwLock<HashMap<String, PlayerStats>>>,
}

impl InMemoryStatsRepository {
    pub fn new() -> Self {
        Self {
            players: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn player_count(&self) -> usize {
        self.players.read().await.len()
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    async fn ensure_player(&self, player_id: &str, username: &str) -> Result<(), StatsError> {
        let mut players = self.players.write().await;
        players
            .entry(player_id.to_string())
            .and_modify(|stats| stats.username = username.to_string())
            .or_insert_with(|| PlayerStats::new(player_id, username));
        Ok(())
    }

    async fn get_streak_state(
        &self,
        player_id: &str,
        scope: StreakScope,
    ) -> Result<Option<StreakCounters>, StatsError> {
        let players = self.players.read().await;
        Ok(players.get(player_id).map(|stats| stats.streaks(scope)))
    }

    async fn upsert_stats(
        &self,
        player_id: &str,
        username: &str,
        upsert: &StatsUpsert,
    ) -> Result<(), StatsError> {
        let mut players = self.players.write().await;
        let stats = players
            .entry(player_id.to_string())
            .or_insert_with(|| PlayerStats::new(player_id, username));
        stats.username = username.to_string();
        stats.apply(upsert);
        Ok(())
    }

    async fn get_player_stats(&self, player_id: &str) -> Result<Option<PlayerStats>, StatsError> {
        let players = self.players.read().await;
        Ok(players.get(player_id).cloned())
    }

    async fn get_leaderboard(
        &self,
        offset: i64,
        metric: LeaderboardMetric,
    ) -> Result<Vec<LeaderboardEntry>, StatsError> {
        if offset < 0 {
            return Err(StatsError::Validation(
                "Leaderboard offset cannot be negative".to_string(),
            ));
        }

        let players = self.players.read().await;
        let mut entries: Vec<LeaderboardEntry> = players
            .values()
            .map(|stats| LeaderboardEntry {
                player_id: stats.player_id.clone(),
                username: stats.username.clone(),
                value: stats.metric(metric),
            })
            .collect();

        entries.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.username.cmp(&b.username)));

        Ok(entries
            .into_iter()
            .skip(offset as usize)
            .take(LEADERBOARD_PAGE_SIZE as usize)
            .collect())
    }
}

const CREATE_PLAYERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS players (
    player_id TEXT PRIMARY KEY,
    username TEXT NOT NULL,
    total_games_played BIGINT NOT NULL DEFAULT 0,
    total_wins BIGINT NOT NULL DEFAULT 0,
    total_losses BIGINT NOT NULL DEFAULT 0,
    total_draws BIGINT NOT NULL DEFAULT 0,
    current_win_streak BIGINT NOT NULL DEFAULT 0,
    current_loss_streak BIGINT NOT NULL DEFAULT 0,
    longest_win_streak BIGINT NOT NULL DEFAULT 0,
    longest_loss_streak BIGINT NOT NULL DEFAULT 0,
    total_rounds_played BIGINT NOT NULL DEFAULT 0,
    total_wins_rounds BIGINT NOT NULL DEFAULT 0,
    total_losses_rounds BIGINT NOT NULL DEFAULT 0,
    total_draws_rounds BIGINT NOT NULL DEFAULT 0,
    current_win_streak_round BIGINT NOT NULL DEFAULT 0,
    current_loss_streak_round BIGINT NOT NULL DEFAULT 0,
    longest_win_streak_round BIGINT NOT NULL DEFAULT 0,
    longest_loss_streak_round BIGINT NOT NULL DEFAULT 0,
    total_guesses BIGINT NOT NULL DEFAULT 0,
    total_good_guesses BIGINT NOT NULL DEFAULT 0,
    total_bad_guesses BIGINT NOT NULL DEFAULT 0
)
"#;

// Counters are added to the existing row. Streak parameters are NULL when the
// write does not touch that scope, which keeps the stored current values.
const UPSERT_STATS: &str = r#"
INSERT INTO players (
    player_id, username,
    total_games_played, total_wins, total_losses, total_draws,
    total_rounds_played, total_wins_rounds, total_losses_rounds, total_draws_rounds,
    total_guesses, total_good_guesses, total_bad_guesses,
    current_win_streak, current_loss_streak, longest_win_streak, longest_loss_streak,
    current_win_streak_round, current_loss_streak_round,
    longest_win_streak_round, longest_loss_streak_round
)
VALUES (
    $1, $2,
    $3, $4, $5, $6,
    $7, $8, $9, $10,
    $11, $12, $13,
    COALESCE($14, 0), COALESCE($15, 0), COALESCE($16, 0), COALESCE($17, 0),
    COALESCE($18, 0), COALESCE($19, 0), COALESCE($20, 0), COALESCE($21, 0)
)
ON CONFLICT (player_id) DO UPDATE
SET
    username = EXCLUDED.username,
    total_games_played = players.total_games_played + $3,
    total_wins = players.total_wins + $4,
    total_losses = players.total_losses + $5,
    total_draws = players.total_draws + $6,
    total_rounds_played = players.total_rounds_played + $7,
    total_wins_rounds = players.total_wins_rounds + $8,
    total_losses_rounds = players.total_losses_rounds + $9,
    total_draws_rounds = players.total_draws_rounds + $10,
    total_guesses = players.total_guesses + $11,
    total_good_guesses = players.total_good_guesses + $12,
    total_bad_guesses = players.total_bad_guesses + $13,
    current_win_streak = COALESCE($14, players.current_win_streak),
    current_loss_streak = COALESCE($15, players.current_loss_streak),
    longest_win_streak = GREATEST(players.longest_win_streak, COALESCE($16, 0)),
    longest_loss_streak = GREATEST(players.longest_loss_streak, COALESCE($17, 0)),
    current_win_streak_round = COALESCE($18, players.current_win_streak_round),
    current_loss_streak_round = COALESCE($19, players.current_loss_streak_round),
    longest_win_streak_round = GREATEST(players.longest_win_streak_round, COALESCE($20, 0)),
    longest_loss_streak_round = GREATEST(players.longest_loss_streak_round, COALESCE($21, 0))
"#;

/// PostgreSQL implementation backed by the `players` table
pub struct PostgresStatsRepository {
    pool: PgPool,
}

impl PostgresStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the players table when it does not exist yet
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), StatsError> {
        sqlx::query(CREATE_PLAYERS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to create players table");
                StatsError::from(e)
            })?;
        Ok(())
    }
}

#[async_trait]
impl StatsRepository for PostgresStatsRepository {
    #[instrument(skip(self))]
    async fn ensure_player(&self, player_id: &str, username: &str) -> Result<(), StatsError> {
        sqlx::query(
            "INSERT INTO players (player_id, username) VALUES ($1, $2) \
             ON CONFLICT (player_id) DO UPDATE SET username = EXCLUDED.username",
        )
        .bind(player_id)
        .bind(username)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, player_id = %player_id, "Failed to insert player");
            StatsError::from(e)
        })?;

        debug!(player_id = %player_id, "Player registered");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_streak_state(
        &self,
        player_id: &str,
        scope: StreakScope,
    ) -> Result<Option<StreakCounters>, StatsError> {
        let query = match scope {
            StreakScope::Game => {
                "SELECT current_win_streak, current_loss_streak, longest_win_streak, longest_loss_streak \
                 FROM players WHERE player_id = $1"
            }
            StreakScope::Round => {
                "SELECT current_win_streak_round, current_loss_streak_round, \
                 longest_win_streak_round, longest_loss_streak_round \
                 FROM players WHERE player_id = $1"
            }
        };

        let row: Option<(i64, i64, i64, i64)> = sqlx::query_as(query)
            .bind(player_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, player_id = %player_id, "Failed to fetch streaks");
                StatsError::from(e)
            })?;

        Ok(row.map(
            |(current_win, current_loss, longest_win, longest_loss)| StreakCounters {
                current_win,
                current_loss,
                longest_win,
                longest_loss,
            },
        ))
    }

    #[instrument(skip(self, upsert))]
    async fn upsert_stats(
        &self,
        player_id: &str,
        username: &str,
        upsert: &StatsUpsert,
    ) -> Result<(), StatsError> {
        let delta = &upsert.delta;
        let game = upsert.game_streaks;
        let round = upsert.round_streaks;

        sqlx::query(UPSERT_STATS)
            .bind(player_id)
            .bind(username)
            .bind(delta.games_played)
            .bind(delta.wins)
            .bind(delta.losses)
            .bind(delta.draws)
            .bind(delta.rounds_played)
            .bind(delta.round_wins)
            .bind(delta.round_losses)
            .bind(delta.round_draws)
            .bind(delta.guesses)
            .bind(delta.good_guesses)
            .bind(delta.bad_guesses)
            .bind(game.map(|s| s.current_win))
            .bind(game.map(|s| s.current_loss))
            .bind(game.map(|s| s.longest_win))
            .bind(game.map(|s| s.longest_loss))
            .bind(round.map(|s| s.current_win))
            .bind(round.map(|s| s.current_loss))
            .bind(round.map(|s| s.longest_win))
            .bind(round.map(|s| s.longest_loss))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, player_id = %player_id, "Failed to upsert player stats");
                StatsError::from(e)
            })?;

        debug!(player_id = %player_id, "Player stats upserted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_player_stats(&self, player_id: &str) -> Result<Option<PlayerStats>, StatsError> {
        sqlx::query_as::<_, PlayerStats>("SELECT * FROM players WHERE player_id = $1")
            .bind(player_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, player_id = %player_id, "Failed to fetch player stats");
                StatsError::from(e)
            })
    }

    #[instrument(skip(self))]
    async fn get_leaderboard(
        &self,
        offset: i64,
        metric: LeaderboardMetric,
    ) -> Result<Vec<LeaderboardEntry>, StatsError> {
        if offset < 0 {
            return Err(StatsError::Validation(
                "Leaderboard offset cannot be negative".to_string(),
            ));
        }

        // The column comes from a closed enum, never from user input
        let query = format!(
            "SELECT player_id, username, {column} AS value FROM players \
             ORDER BY {column} DESC, username ASC LIMIT $1 OFFSET $2",
            column = metric.column()
        );

        sqlx::query_as::<_, LeaderboardEntry>(&query)
            .bind(LEADERBOARD_PAGE_SIZE)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, metric = %metric, "Failed to fetch leaderboard");
                StatsError::from(e)
            })
    }
}
