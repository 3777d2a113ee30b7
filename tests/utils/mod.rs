pub mod players;
pub mod setup;

// Re-export main utilities for use by test files
pub use players::{answer_rounds, Answer};
pub use setup::{TestSetup, TestSetupBuilder, CRAFTING_TABLE, STICK};
