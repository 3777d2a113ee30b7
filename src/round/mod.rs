pub use answers::AnswerSet;
pub use engine::{RoundContext, RoundEngine, RoundOutcome, RoundResolution};
pub use state::{GuessVerdict, RoundState};

mod answers;
mod engine;
mod state;

use thiserror::Error;

use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum RoundError {
    #[error("No playable recipe available")]
    NoRecipe,

    #[error("Answer window too long: {0:?}")]
    InvalidDuration(std::time::Duration),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}
