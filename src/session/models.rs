use std::collections::{HashMap, HashSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use super::SessionError;
use crate::stats::{GameOutcome, GuessTally, RoundResult, SessionStats, StreakCounters};
use crate::transport::{ChannelId, Player, PlayerId};

pub const MIN_ROOM_PLAYERS: usize = 2;
/// Longest answer window a session may ask for
pub const MAX_ROUND_DURATION: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionKind {
    Solo,
    Duel,
    Room,
}

/// Pacing shared by every session of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    pub round_duration: Duration,
    pub inter_round_pause: Duration,
    pub room_start_delay: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            round_duration: Duration::from_secs(20),
            inter_round_pause: Duration::from_secs(3),
            room_start_delay: Duration::from_secs(5),
        }
    }
}

/// A validated session, ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub session_id: String,
    pub kind: SessionKind,
    /// Where the session starts and its result is posted
    pub channel_id: ChannelId,
    /// Where rounds are posted (the room thread, otherwise the channel)
    pub round_channel_id: ChannelId,
    /// Channels guesses are read from
    pub sources: Vec<ChannelId>,
    /// Participants in join order
    pub players: Vec<Player>,
    pub rounds_total: u32,
    pub round_duration: Duration,
}

impl SessionConfig {
    pub fn solo(
        player: Player,
        channel_id: impl Into<ChannelId>,
        rounds_total: u32,
        round_duration: Duration,
    ) -> Result<Self, SessionError> {
        validate_rounds(rounds_total, round_duration)?;
        let channel_id = channel_id.into();

        Ok(Self::build(
            SessionKind::Solo,
            channel_id.clone(),
            channel_id.clone(),
            vec![channel_id],
            vec![player],
            rounds_total,
            round_duration,
        ))
    }

    pub fn duel(
        challenger: Player,
        opponent: Player,
        channel_id: impl Into<ChannelId>,
        rounds_total: u32,
        round_duration: Duration,
    ) -> Result<Self, SessionError> {
        validate_rounds(rounds_total, round_duration)?;
        if challenger.id == opponent.id {
            return Err(SessionError::InvalidPlayers(
                "You cannot challenge yourself".to_string(),
            ));
        }
        let channel_id = channel_id.into();

        Ok(Self::build(
            SessionKind::Duel,
            channel_id.clone(),
            channel_id.clone(),
            vec![channel_id],
            vec![challenger, opponent],
            rounds_total,
            round_duration,
        ))
    }

    /// A room listens to its channel and, when it has one, its thread. Rounds are
    /// posted in the thread.
    pub fn room(
        players: Vec<Player>,
        max_players: usize,
        channel_id: impl Into<ChannelId>,
        thread_id: Option<ChannelId>,
        rounds_total: u32,
        round_duration: Duration,
    ) -> Result<Self, SessionError> {
        validate_rounds(rounds_total, round_duration)?;
        if players.len() < MIN_ROOM_PLAYERS {
            return Err(SessionError::InvalidPlayers(
                "Not enough players to start the game".to_string(),
            ));
        }
        if players.len() > max_players {
            return Err(SessionError::InvalidPlayers(format!(
                "The room is full ({} players max)",
                max_players
            )));
        }
        let mut seen = HashSet::new();
        if !players.iter().all(|player| seen.insert(player.id.as_str())) {
            return Err(SessionError::InvalidPlayers(
                "A player joined the room twice".to_string(),
            ));
        }

        let channel_id = channel_id.into();
        let (round_channel_id, sources) = match thread_id {
            Some(thread_id) if thread_id != channel_id => {
                (thread_id.clone(), vec![channel_id.clone(), thread_id])
            }
            _ => (channel_id.clone(), vec![channel_id.clone()]),
        };

        Ok(Self::build(
            SessionKind::Room,
            channel_id,
            round_channel_id,
            sources,
            players,
            rounds_total,
            round_duration,
        ))
    }

    fn build(
        kind: SessionKind,
        channel_id: ChannelId,
        round_channel_id: ChannelId,
        sources: Vec<ChannelId>,
        players: Vec<Player>,
        rounds_total: u32,
        round_duration: Duration,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            kind,
            channel_id,
            round_channel_id,
            sources,
            players,
            rounds_total,
            round_duration,
        }
    }
}

fn validate_rounds(rounds_total: u32, round_duration: Duration) -> Result<(), SessionError> {
    if rounds_total == 0 {
        return Err(SessionError::InvalidRounds);
    }
    if round_duration.is_zero() || round_duration > MAX_ROUND_DURATION {
        return Err(SessionError::InvalidRoundDuration {
            max_seconds: MAX_ROUND_DURATION.as_secs(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionPhase {
    Running,
    Complete,
}

/// Scores and counters of a running session
#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: String,
    pub phase: SessionPhase,
    pub players: Vec<Player>,
    pub scores: HashMap<PlayerId, u32>,
    /// Round streaks inside this session only
    pub round_streaks: HashMap<PlayerId, StreakCounters>,
    pub guesses: HashMap<PlayerId, GuessTally>,
    /// Rounds that reached an outcome (won or timed out)
    pub rounds_played: u32,
    /// Round slots used, including failed rounds
    pub rounds_consumed: u32,
    pub rounds_total: u32,
}

impl SessionState {
    pub fn new(config: &SessionConfig) -> Self {
        let ids = config.players.iter().map(|player| player.id.clone());
        Self {
            session_id: config.session_id.clone(),
            phase: SessionPhase::Running,
            players: config.players.clone(),
            scores: ids.clone().map(|id| (id, 0)).collect(),
            round_streaks: ids.clone().map(|id| (id, StreakCounters::default())).collect(),
            guesses: ids.map(|id| (id, GuessTally::default())).collect(),
            rounds_played: 0,
            rounds_consumed: 0,
            rounds_total: config.rounds_total,
        }
    }

    pub fn has_rounds_left(&self) -> bool {
        self.rounds_consumed < self.rounds_total
    }

    pub fn next_round_number(&self) -> u32 {
        self.rounds_consumed + 1
    }

    /// Applies a finished round: the winner scores, everybody else loses the
    /// round. Without a winner everybody loses. Returns each participant's
    /// round result in join order.
    pub fn apply_round(&mut self, winner: Option<&str>) -> Vec<(Player, RoundResult)> {
        self.rounds_played += 1;
        self.rounds_consumed += 1;

        if let Some(winner) = winner {
            if let Some(score) = self.scores.get_mut(winner) {
                *score += 1;
            }
        }

        let results: Vec<(Player, RoundResult)> = self
            .players
            .iter()
            .map(|player| {
                let result = if winner == Some(player.id.as_str()) {
                    RoundResult::Win
                } else {
                    RoundResult::Lose
                };
                (player.clone(), result)
            })
            .collect();

        for (player, result) in &results {
            let streaks = self.round_streaks.entry(player.id.clone()).or_default();
            *streaks = streaks.apply_round(*result);
        }

        results
    }

    /// A round that could not be played still uses its slot
    pub fn skip_round(&mut self) {
        self.rounds_consumed += 1;
    }

    pub fn merge_guesses(&mut self, guesses: &HashMap<PlayerId, GuessTally>) {
        for (player_id, tally) in guesses {
            self.guesses.entry(player_id.clone()).or_default().merge(tally);
        }
    }

    pub fn score(&self, player_id: &str) -> u32 {
        self.scores.get(player_id).copied().unwrap_or_default()
    }

    pub fn session_stats(&self, player_id: &str) -> SessionStats {
        SessionStats {
            rounds_played: i64::from(self.rounds_played),
            guesses: self.guesses.get(player_id).copied().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub place: usize,
    pub player: Player,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub player: Player,
    pub score: u32,
    pub outcome: GameOutcome,
}

/// A stats write that failed; the game went on without it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceWarning {
    pub player_id: PlayerId,
    pub operation: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub kind: SessionKind,
    pub rounds_played: u32,
    pub rounds_total: u32,
    pub ranking: Vec<RankingEntry>,
    pub results: Vec<PlayerResult>,
    pub warnings: Vec<PersistenceWarning>,
}

impl SessionSummary {
    pub fn result_for(&self, player_id: &str) -> Option<&PlayerResult> {
        self.results.iter().find(|result| result.player.id == player_id)
    }
}
