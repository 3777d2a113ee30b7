use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{Display, EnumIter, EnumString};

pub const LEADERBOARD_PAGE_SIZE: i64 = 10;

/// Result of one round from a participant's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoundResult {
    Win,
    Lose,
}

/// Result of a whole session from a participant's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameOutcome {
    Win,
    Lose,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StreakScope {
    Game,
    Round,
}

/// Current and longest win/loss streaks at one scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakCounters {
    pub current_win: i64,
    pub current_loss: i64,
    pub longest_win: i64,
    pub longest_loss: i64,
}

/// Guesses made by one player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessTally {
    pub total: i64,
    pub correct: i64,
    pub incorrect: i64,
}

impl GuessTally {
    pub fn record_correct(&mut self) {
        self.total += 1;
        self.correct += 1;
    }

    pub fn record_incorrect(&mut self) {
        self.total += 1;
        self.incorrect += 1;
    }

    pub fn merge(&mut self, other: &GuessTally) {
        self.total += other.total;
        self.correct += other.correct;
        self.incorrect += other.incorrect;
    }
}

/// What one player accumulated during a session, committed when it ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub rounds_played: i64,
    pub guesses: GuessTally,
}

/// Additive counters of an upsert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsDelta {
    pub games_played: i64,
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
    pub rounds_played: i64,
    pub round_wins: i64,
    pub round_losses: i64,
    pub round_draws: i64,
    pub guesses: i64,
    pub good_guesses: i64,
    pub bad_guesses: i64,
}

/// One write against a player's row: counters are added, streaks (when
/// present) replace the current values and can only raise the longest ones
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsUpsert {
    pub delta: StatsDelta,
    pub game_streaks: Option<StreakCounters>,
    pub round_streaks: Option<StreakCounters>,
}

/// Persisted row of the players table
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player_id: String,
    pub username: String,
    pub total_games_played: i64,
    pub total_wins: i64,
    pub total_losses: i64,
    pub total_draws: i64,
    pub current_win_streak: i64,
    pub current_loss_streak: i64,
    pub longest_win_streak: i64,
    pub longest_loss_streak: i64,
    pub total_rounds_played: i64,
    pub total_wins_rounds: i64,
    pub total_losses_rounds: i64,
    pub total_draws_rounds: i64,
    pub current_win_streak_round: i64,
    pub current_loss_streak_round: i64,
    pub longest_win_streak_round: i64,
    pub longest_loss_streak_round: i64,
    pub total_guesses: i64,
    pub total_good_guesses: i64,
    pub total_bad_guesses: i64,
}

impl PlayerStats {
    pub fn new(player_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            username: username.into(),
            ..Self::default()
        }
    }

    pub fn streaks(&self, scope: StreakScope) -> StreakCounters {
        match scope {
            StreakScope::Game => StreakCounters {
                current_win: self.current_win_streak,
                current_loss: self.current_loss_streak,
                longest_win: self.longest_win_streak,
                longest_loss: self.longest_loss_streak,
            },
            StreakScope::Round => StreakCounters {
                current_win: self.current_win_streak_round,
                current_loss: self.current_loss_streak_round,
                longest_win: self.longest_win_streak_round,
                longest_loss: self.longest_loss_streak_round,
            },
        }
    }

    /// Applies an upsert the way the database does
    pub fn apply(&mut self, upsert: &StatsUpsert) {
        let delta = &upsert.delta;
        self.total_games_played += delta.games_played;
        self.total_wins += delta.wins;
        self.total_losses += delta.losses;
        self.total_draws += delta.draws;
        self.total_rounds_played += delta.rounds_played;
        self.total_wins_rounds += delta.round_wins;
        self.total_losses_rounds += delta.round_losses;
        self.total_draws_rounds += delta.round_draws;
        self.total_guesses += delta.guesses;
        self.total_good_guesses += delta.good_guesses;
        self.total_bad_guesses += delta.bad_guesses;

        if let Some(streaks) = upsert.game_streaks {
            self.current_win_streak = streaks.current_win;
            self.current_loss_streak = streaks.current_loss;
            self.longest_win_streak = self.longest_win_streak.max(streaks.longest_win);
            self.longest_loss_streak = self.longest_loss_streak.max(streaks.longest_loss);
        }

        if let Some(streaks) = upsert.round_streaks {
            self.current_win_streak_round = streaks.current_win;
            self.current_loss_streak_round = streaks.current_loss;
            self.longest_win_streak_round = self.longest_win_streak_round.max(streaks.longest_win);
            self.longest_loss_streak_round =
                self.longest_loss_streak_round.max(streaks.longest_loss);
        }
    }

    pub fn metric(&self, metric: LeaderboardMetric) -> i64 {
        match metric {
            LeaderboardMetric::Wins => self.total_wins,
            LeaderboardMetric::Losses => self.total_losses,
            LeaderboardMetric::WinStreak => self.longest_win_streak,
            LeaderboardMetric::LossStreak => self.longest_loss_streak,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaderboardMetric {
    Wins,
    Losses,
    WinStreak,
    LossStreak,
}

impl LeaderboardMetric {
    /// Column of the players table the metric ranks by
    pub fn column(&self) -> &'static str {
        match self {
            LeaderboardMetric::Wins => "total_wins",
            LeaderboardMetric::Losses => "total_losses",
            LeaderboardMetric::WinStreak => "longest_win_streak",
            LeaderboardMetric::LossStreak => "longest_loss_streak",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            LeaderboardMetric::Wins => "🏆 Most wins",
            LeaderboardMetric::Losses => "💔 Most losses",
            LeaderboardMetric::WinStreak => "🔥 Longest win streaks",
            LeaderboardMetric::LossStreak => "💀 Longest loss streaks",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: String,
    pub username: String,
    pub value: i64,
}
