use std::collections::{HashMap, HashSet};

use tokio::time::Instant;

use super::answers::AnswerSet;
use crate::catalog::Recipe;
use crate::stats::GuessTally;
use crate::transport::PlayerId;

/// What a guess did to the round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessVerdict {
    /// First correct answer: the author won the round
    Winner,
    Rejected,
    /// Author is not playing this round, or the round already has a winner
    Ignored,
}

/// Live state of one round, owned by the task collecting its guesses
#[derive(Debug)]
pub struct RoundState {
    pub recipe: Recipe,
    pub answers: AnswerSet,
    pub deadline: Instant,
    eligible: HashSet<PlayerId>,
    winner: Option<PlayerId>,
    guesses: HashMap<PlayerId, GuessTally>,
}

impl RoundState {
    pub fn new<'a>(
        recipe: Recipe,
        deadline: Instant,
        eligible: impl IntoIterator<Item = &'a PlayerId>,
    ) -> Self {
        let answers = AnswerSet::for_item(&recipe.result);
        Self {
            recipe,
            answers,
            deadline,
            eligible: eligible.into_iter().cloned().collect(),
            winner: None,
            guesses: HashMap::new(),
        }
    }

    pub fn is_eligible(&self, player_id: &str) -> bool {
        self.eligible.contains(player_id)
    }

    pub fn winner(&self) -> Option<&PlayerId> {
        self.winner.as_ref()
    }

    /// Evaluates a guess. Only the first correct guess sets the winner; once
    /// set, every later guess is ignored.
    pub fn submit_guess(&mut self, author: &str, content: &str) -> GuessVerdict {
        if self.winner.is_some() || !self.is_eligible(author) {
            return GuessVerdict::Ignored;
        }

        let tally = self.guesses.entry(author.to_string()).or_default();
        if self.answers.matches(content) {
            tally.record_correct();
            self.winner = Some(author.to_string());
            GuessVerdict::Winner
        } else {
            tally.record_incorrect();
            GuessVerdict::Rejected
        }
    }

    pub fn into_guesses(self) -> HashMap<PlayerId, GuessTally> {
        self.guesses
    }
}
