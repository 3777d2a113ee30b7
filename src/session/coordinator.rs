use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use super::{
    models::{
        PersistenceWarning, SessionConfig, SessionKind, SessionPhase, SessionState,
        SessionSummary, SessionTiming,
    },
    outcome,
};
use crate::round::{RoundContext, RoundEngine, RoundOutcome};
use crate::stats::{RoundResult, StatsAggregator, StatsError};
use crate::transport::{Announcement, AnnouncementKind, Player};

/// Runs whole sessions: a fixed number of rounds, then results and stats
#[derive(Clone)]
pub struct SessionCoordinator {
    engine: RoundEngine,
    stats: Arc<StatsAggregator>,
    timing: SessionTiming,
}

impl SessionCoordinator {
    pub fn new(engine: RoundEngine, stats: Arc<StatsAggregator>, timing: SessionTiming) -> Self {
        Self {
            engine,
            stats,
            timing,
        }
    }

    /// Plays the session to the end. Failed rounds and failed stats writes do
    /// not stop it; the latter are returned as warnings in the summary.
    #[instrument(
        name = "run_session",
        skip(self, config),
        fields(session_id = %config.session_id, kind = %config.kind)
    )]
    pub async fn run(&self, config: SessionConfig) -> SessionSummary {
        let mut warnings = Vec::new();

        for player in &config.players {
            if let Err(e) = self.stats.register_player(&player.id, &player.username).await {
                warnings.push(persistence_warning(player, "register player", e));
            }
        }

        self.announce(
            &config.channel_id,
            AnnouncementKind::SessionStarting,
            starting_message(&config),
        )
        .await;

        if config.kind == SessionKind::Room {
            tokio::time::sleep(self.timing.room_start_delay).await;
        }

        let mut state = SessionState::new(&config);
        info!(players = config.players.len(), rounds = config.rounds_total, "Session running");

        while state.has_rounds_left() {
            let ctx = RoundContext {
                session_id: &config.session_id,
                channel_id: &config.round_channel_id,
                sources: &config.sources,
                participants: &config.players,
                number: state.next_round_number(),
                total: config.rounds_total,
                duration: config.round_duration,
                allow_rerun: config.kind == SessionKind::Solo,
            };

            match self.engine.play_round(&ctx).await {
                Ok(resolution) => {
                    state.merge_guesses(&resolution.guesses);
                    match resolution.outcome {
                        RoundOutcome::Replayed { .. } => continue,
                        RoundOutcome::Aborted { reason } => {
                            warn!(round = ctx.number, reason = %reason, "Round aborted");
                            state.skip_round();
                        }
                        RoundOutcome::Won { winner, .. } => {
                            let results = state.apply_round(Some(winner.as_str()));
                            self.record_round(results, &mut warnings).await;
                        }
                        RoundOutcome::TimedOut { .. } => {
                            let results = state.apply_round(None);
                            self.record_round(results, &mut warnings).await;
                        }
                    }
                }
                Err(e) => {
                    error!(round = ctx.number, error = %e, "Round could not be played");
                    self.announce(
                        &config.round_channel_id,
                        AnnouncementKind::RoundFailed,
                        "❌ This round could not be started. Moving on.".to_string(),
                    )
                    .await;
                    state.skip_round();
                }
            }

            if state.has_rounds_left() {
                tokio::time::sleep(self.timing.inter_round_pause).await;
            }
        }

        state.phase = SessionPhase::Complete;
        let ranking = outcome::rank(&state);
        let results = outcome::decide(config.kind, &ranking);

        self.announce(
            &config.channel_id,
            AnnouncementKind::SessionResult,
            outcome::format_result(config.kind, &results),
        )
        .await;
        if config.kind != SessionKind::Solo {
            self.announce(
                &config.channel_id,
                AnnouncementKind::SessionSummary,
                outcome::format_ranking(&ranking),
            )
            .await;
        }

        for result in &results {
            let session_stats = state.session_stats(&result.player.id);
            if let Err(e) = self
                .stats
                .commit_session(
                    &result.player.id,
                    &result.player.username,
                    &session_stats,
                    result.outcome,
                )
                .await
            {
                warnings.push(persistence_warning(&result.player, "commit session", e));
            }
        }

        if !warnings.is_empty() {
            warn!(failures = warnings.len(), "Some stats were not saved");
            self.announce(
                &config.channel_id,
                AnnouncementKind::Notice,
                "⚠️ Stats could not be saved for this game.".to_string(),
            )
            .await;
        }

        info!(rounds_played = state.rounds_played, "Session complete");

        SessionSummary {
            session_id: config.session_id,
            kind: config.kind,
            rounds_played: state.rounds_played,
            rounds_total: config.rounds_total,
            ranking,
            results,
            warnings,
        }
    }

    async fn record_round(
        &self,
        results: Vec<(Player, RoundResult)>,
        warnings: &mut Vec<PersistenceWarning>,
    ) {
        for (player, result) in results {
            if let Err(e) = self
                .stats
                .record_round_outcome(&player.id, &player.username, result)
                .await
            {
                warnings.push(persistence_warning(&player, "record round", e));
            }
        }
    }

    async fn announce(&self, channel_id: &str, kind: AnnouncementKind, content: String) {
        if let Err(e) = self
            .engine
            .transport()
            .announce(channel_id, Announcement::new(kind, content))
            .await
        {
            warn!(channel_id = %channel_id, error = %e, "Failed to announce");
        }
    }
}

fn persistence_warning(player: &Player, operation: &str, error: StatsError) -> PersistenceWarning {
    error!(player_id = %player.id, operation, error = %error, "Stats write failed");
    PersistenceWarning {
        player_id: player.id.clone(),
        operation: operation.to_string(),
        error: error.to_string(),
    }
}

fn starting_message(config: &SessionConfig) -> String {
    match config.kind {
        SessionKind::Solo => format!(
            "🎮 {}, guess the item crafted by each recipe! {} round(s) of {} seconds.",
            config.players.first().map(Player::mention).unwrap_or_default(),
            config.rounds_total,
            config.round_duration.as_secs()
        ),
        SessionKind::Duel => {
            let mentions: Vec<String> = config.players.iter().map(Player::mention).collect();
            format!(
                "⚔️ Crafting duel between {} in {} rounds! Get ready!",
                mentions.join(" and "),
                config.rounds_total
            )
        }
        SessionKind::Room => format!(
            "🎮 The game starts with {} players! {} rounds.",
            config.players.len(),
            config.rounds_total
        ),
    }
}
