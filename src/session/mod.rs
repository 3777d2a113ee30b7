// Public API - what other modules can use
pub use coordinator::SessionCoordinator;
pub use errors::SessionError;
pub use handlers::{start_duel, start_room, start_solo};
pub use models::{
    PersistenceWarning, PlayerResult, RankingEntry, SessionConfig, SessionKind, SessionPhase,
    SessionState, SessionSummary, SessionTiming,
};

// Internal modules
mod coordinator;
mod errors;
mod handlers;
pub mod models;
pub mod outcome;
pub mod types;
