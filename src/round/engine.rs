use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use super::{
    state::{GuessVerdict, RoundState},
    RoundError,
};
use crate::catalog::{Item, RecipeSource};
use crate::grid::{is_oversized, NormalizedGrid};
use crate::render::GridRenderer;
use crate::stats::GuessTally;
use crate::transport::{
    Announcement, AnnouncementKind, Attachment, ButtonAction, ChannelId, InboundEvent,
    MessageHandle, Player, PlayerId, Transport,
};

pub const DEFAULT_REJECTION_NOTICE_TTL: Duration = Duration::from_secs(5);

/// How a round ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    Won { winner: PlayerId, result: Item },
    TimedOut { result: Item },
    /// The player asked for another recipe before anybody answered
    Replayed { result: Item },
    /// The grid could not be rendered; nobody played
    Aborted { reason: String },
}

impl RoundOutcome {
    pub fn winner(&self) -> Option<&PlayerId> {
        match self {
            RoundOutcome::Won { winner, .. } => Some(winner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResolution {
    pub outcome: RoundOutcome,
    pub guesses: HashMap<PlayerId, GuessTally>,
}

impl RoundResolution {
    fn aborted(reason: String) -> Self {
        Self {
            outcome: RoundOutcome::Aborted { reason },
            guesses: HashMap::new(),
        }
    }
}

/// Everything a round needs to know about the session running it
#[derive(Debug, Clone)]
pub struct RoundContext<'a> {
    pub session_id: &'a str,
    /// Channel the round is announced in
    pub channel_id: &'a str,
    /// Channels guesses are read from, merged in arrival order
    pub sources: &'a [ChannelId],
    pub participants: &'a [Player],
    pub number: u32,
    pub total: u32,
    pub duration: Duration,
    /// Offer the rerun button (solo sessions)
    pub allow_rerun: bool,
}

impl RoundContext<'_> {
    fn participant(&self, player_id: &str) -> Option<&Player> {
        self.participants.iter().find(|player| player.id == player_id)
    }
}

/// Runs single rounds: draw, render, collect guesses, announce the outcome
#[derive(Clone)]
pub struct RoundEngine {
    transport: Arc<dyn Transport>,
    renderer: Arc<dyn GridRenderer>,
    recipes: Arc<dyn RecipeSource>,
    rejection_notice_ttl: Duration,
}

impl RoundEngine {
    pub fn new(
        transport: Arc<dyn Transport>,
        renderer: Arc<dyn GridRenderer>,
        recipes: Arc<dyn RecipeSource>,
    ) -> Self {
        Self {
            transport,
            renderer,
            recipes,
            rejection_notice_ttl: DEFAULT_REJECTION_NOTICE_TTL,
        }
    }

    /// How long a wrong-answer notice stays visible
    pub fn with_rejection_notice_ttl(mut self, ttl: Duration) -> Self {
        self.rejection_notice_ttl = ttl;
        self
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    #[instrument(
        name = "play_round",
        skip(self, ctx),
        fields(session_id = %ctx.session_id, round = ctx.number)
    )]
    pub async fn play_round(&self, ctx: &RoundContext<'_>) -> Result<RoundResolution, RoundError> {
        if Instant::now().checked_add(ctx.duration).is_none() {
            return Err(RoundError::InvalidDuration(ctx.duration));
        }
        let recipe = self.recipes.draw_recipe().ok_or(RoundError::NoRecipe)?;
        let shape = recipe.shape.as_deref().unwrap_or_default();
        if is_oversized(shape) {
            warn!(recipe = %recipe.key, "Recipe shape exceeds 3x3, clamping");
        }
        let grid = NormalizedGrid::from_shape(shape, |id| self.recipes.resolve_item(id));

        let image = match self.renderer.render(&grid).await {
            Ok(image) => image,
            Err(e) => {
                error!(recipe = %recipe.key, error = %e, "Failed to render crafting grid");
                self.announce_best_effort(
                    ctx.channel_id,
                    Announcement::new(
                        AnnouncementKind::RoundFailed,
                        "❌ Something went wrong while drawing the crafting grid. This round is skipped.",
                    ),
                )
                .await;
                return Ok(RoundResolution::aborted(e.to_string()));
            }
        };

        // Listen before the grid is shown so no early answer is missed
        let mut listener = self.transport.listen(ctx.sources).await?;

        let mut announcement = Announcement::new(
            AnnouncementKind::RoundStarted,
            format!(
                "🎮 **Round {}/{}:** find the item made with this recipe. First correct answer wins! ({}s)",
                ctx.number,
                ctx.total,
                ctx.duration.as_secs()
            ),
        )
        .with_attachment(Attachment {
            name: self.renderer.attachment_name().to_string(),
            content_type: self.renderer.content_type().to_string(),
            data: image,
        });
        if ctx.allow_rerun {
            announcement = announcement.with_button(ButtonAction::Rerun);
        }
        self.transport.announce(ctx.channel_id, announcement).await?;

        let deadline = Instant::now()
            .checked_add(ctx.duration)
            .ok_or(RoundError::InvalidDuration(ctx.duration))?;
        let eligible: Vec<&PlayerId> = ctx.participants.iter().map(|player| &player.id).collect();
        let mut state = RoundState::new(recipe, deadline, eligible);
        let mut replayed = false;

        info!(recipe = %state.recipe.key, "Round started");

        while let Some(event) = listener.next_before(state.deadline).await {
            match event {
                InboundEvent::Message {
                    channel_id,
                    message_id,
                    author,
                    content,
                    ..
                } => match state.submit_guess(&author, &content) {
                    GuessVerdict::Winner => {
                        debug!(winner = %author, "Correct guess");
                        break;
                    }
                    GuessVerdict::Rejected => {
                        debug!(player_id = %author, "Wrong guess");
                        self.reject_guess(&channel_id, message_id, &content).await;
                    }
                    GuessVerdict::Ignored => {}
                },
                InboundEvent::Button { author, action, .. } => {
                    if ctx.allow_rerun
                        && action == ButtonAction::Rerun
                        && state.is_eligible(&author)
                    {
                        debug!(player_id = %author, "Rerun requested");
                        replayed = true;
                        break;
                    }
                }
            }
        }
        // Stops every source at once, including the ones that had nothing to say
        listener.close();

        let result = state.recipe.result.clone();
        let outcome = match state.winner().cloned() {
            Some(winner) => RoundOutcome::Won { winner, result },
            None if replayed => RoundOutcome::Replayed { result },
            None => RoundOutcome::TimedOut { result },
        };

        self.announce_outcome(ctx, &outcome).await;
        info!(outcome = ?outcome, "Round finished");

        Ok(RoundResolution {
            outcome,
            guesses: state.into_guesses(),
        })
    }

    async fn reject_guess(&self, channel_id: &str, message_id: u64, guess: &str) {
        let notice = Announcement::new(
            AnnouncementKind::GuessRejected,
            format!("❌ Wrong! \"{}\" is not the right item.", guess.trim()),
        )
        .replying_to(message_id);

        let handle = match self.transport.announce(channel_id, notice).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "Failed to send rejection notice");
                return;
            }
        };

        self.schedule_retraction(handle);
    }

    fn schedule_retraction(&self, handle: MessageHandle) {
        let transport = self.transport.clone();
        let ttl = self.rejection_notice_ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Err(e) = transport.retract(&handle).await {
                warn!(error = %e, message_id = handle.message_id, "Failed to retract notice");
            }
        });
    }

    async fn announce_outcome(&self, ctx: &RoundContext<'_>, outcome: &RoundOutcome) {
        let announcement = match outcome {
            RoundOutcome::Won { winner, result } => {
                let mention = ctx
                    .participant(winner)
                    .map(Player::mention)
                    .unwrap_or_else(|| winner.clone());
                Announcement::new(
                    AnnouncementKind::RoundWon,
                    format!(
                        "🎉 {} won this round! The item was **{}** ({}).",
                        mention, result.localized_display_name, result.display_name
                    ),
                )
            }
            RoundOutcome::TimedOut { result } => Announcement::new(
                AnnouncementKind::RoundTimedOut,
                format!(
                    "⏰ Time's up! Nobody scored. The answer was **{}** ({}).",
                    result.localized_display_name, result.display_name
                ),
            ),
            RoundOutcome::Replayed { result } => Announcement::new(
                AnnouncementKind::Notice,
                format!(
                    "🔁 New recipe coming up. The answer was **{}** ({}).",
                    result.localized_display_name, result.display_name
                ),
            ),
            RoundOutcome::Aborted { .. } => return,
        };

        self.announce_best_effort(ctx.channel_id, announcement).await;
    }

    async fn announce_best_effort(&self, channel_id: &str, announcement: Announcement) {
        if let Err(e) = self.transport.announce(channel_id, announcement).await {
            warn!(channel_id = %channel_id, error = %e, "Failed to announce");
        }
    }
}
