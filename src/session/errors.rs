use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid players: {0}")]
    InvalidPlayers(String),

    #[error("A game needs at least one round")]
    InvalidRounds,

    #[error("Rounds must last between 1 and {max_seconds} seconds")]
    InvalidRoundDuration { max_seconds: u64 },
}
