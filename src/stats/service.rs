use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{debug, instrument};

use super::{
    models::{
        GameOutcome, LeaderboardEntry, LeaderboardMetric, PlayerStats, RoundResult, SessionStats,
        StatsDelta, StatsUpsert, StreakCounters, StreakScope,
    },
    repository::StatsRepository,
    StatsError,
};

/// Folds round events and finished sessions into cumulative player stats
///
/// Each write reads the player's streak tuple, applies the event and writes the
/// result back in one upsert. The read-modify-write is serialized per player so
/// two sessions finishing together cannot interleave on the same row.
pub struct StatsAggregator {
    repository: Arc<dyn StatsRepository>,
    player_mutexes: Arc<RwLock<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl StatsAggregator {
    pub fn new(repository: Arc<dyn StatsRepository>) -> Self {
        Self {
            repository,
            player_mutexes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn repository(&self) -> Arc<dyn StatsRepository> {
        self.repository.clone()
    }

    #[instrument(skip(self))]
    pub async fn register_player(&self, player_id: &str, username: &str) -> Result<(), StatsError> {
        self.repository.ensure_player(player_id, username).await
    }

    /// Applies one round result to the player's round-level streaks and counters
    #[instrument(skip(self))]
    pub async fn record_round_outcome(
        &self,
        player_id: &str,
        username: &str,
        result: RoundResult,
    ) -> Result<StreakCounters, StatsError> {
        let lock = self.player_lock(player_id).await;
        let written = {
            let _guard = lock.lock().await;
            self.write_round_outcome(player_id, username, result).await
        };
        self.release_player_lock(player_id, lock).await;
        written
    }

    /// Commits a finished session: additive counters plus game-level streaks
    ///
    /// Round wins and losses are not counted here; they were already written by
    /// [`StatsAggregator::record_round_outcome`] as the rounds happened.
    #[instrument(skip(self, session))]
    pub async fn commit_session(
        &self,
        player_id: &str,
        username: &str,
        session: &SessionStats,
        outcome: GameOutcome,
    ) -> Result<StreakCounters, StatsError> {
        let lock = self.player_lock(player_id).await;
        let written = {
            let _guard = lock.lock().await;
            self.write_session(player_id, username, session, outcome).await
        };
        self.release_player_lock(player_id, lock).await;
        written
    }

    async fn write_round_outcome(
        &self,
        player_id: &str,
        username: &str,
        result: RoundResult,
    ) -> Result<StreakCounters, StatsError> {
        let streaks = self
            .repository
            .get_streak_state(player_id, StreakScope::Round)
            .await?
            .unwrap_or_default()
            .apply_round(result);

        let delta = match result {
            RoundResult::Win => StatsDelta {
                round_wins: 1,
                ..StatsDelta::default()
            },
            RoundResult::Lose => StatsDelta {
                round_losses: 1,
                ..StatsDelta::default()
            },
        };

        self.repository
            .upsert_stats(
                player_id,
                username,
                &StatsUpsert {
                    delta,
                    game_streaks: None,
                    round_streaks: Some(streaks),
                },
            )
            .await?;

        debug!(player_id = %player_id, %result, ?streaks, "Round outcome recorded");
        Ok(streaks)
    }

    async fn write_session(
        &self,
        player_id: &str,
        username: &str,
        session: &SessionStats,
        outcome: GameOutcome,
    ) -> Result<StreakCounters, StatsError> {
        let streaks = self
            .repository
            .get_streak_state(player_id, StreakScope::Game)
            .await?
            .unwrap_or_default()
            .apply_game(outcome);

        let delta = StatsDelta {
            games_played: 1,
            wins: i64::from(outcome == GameOutcome::Win),
            losses: i64::from(outcome == GameOutcome::Lose),
            draws: i64::from(outcome == GameOutcome::Draw),
            rounds_played: session.rounds_played,
            guesses: session.guesses.total,
            good_guesses: session.guesses.correct,
            bad_guesses: session.guesses.incorrect,
            ..StatsDelta::default()
        };

        self.repository
            .upsert_stats(
                player_id,
                username,
                &StatsUpsert {
                    delta,
                    game_streaks: Some(streaks),
                    round_streaks: None,
                },
            )
            .await?;

        debug!(player_id = %player_id, %outcome, ?streaks, "Session committed");
        Ok(streaks)
    }

    pub async fn player_stats(&self, player_id: &str) -> Result<Option<PlayerStats>, StatsError> {
        self.repository.get_player_stats(player_id).await
    }

    pub async fn leaderboard(
        &self,
        offset: i64,
        metric: LeaderboardMetric,
    ) -> Result<Vec<LeaderboardEntry>, StatsError> {
        self.repository.get_leaderboard(offset, metric).await
    }

    async fn player_lock(&self, player_id: &str) -> Arc<AsyncMutex<()>> {
        {
            let guard = self.player_mutexes.read().await;
            if let Some(lock) = guard.get(player_id) {
                return lock.clone();
            }
        }

        let mut guard = self.player_mutexes.write().await;
        guard
            .entry(player_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Drops the player's lock once no other write holds or awaits it
    async fn release_player_lock(&self, player_id: &str, lock: Arc<AsyncMutex<()>>) {
        let mut guard = self.player_mutexes.write().await;
        let unused = guard
            .get(player_id)
            .is_some_and(|held| Arc::ptr_eq(held, &lock) && Arc::strong_count(&lock) == 2);
        if unused {
            guard.remove(player_id);
        }
    }

    #[cfg(test)]
    async fn tracked_locks(&self) -> usize {
        self.player_mutexes.read().await.len()
    }
}
