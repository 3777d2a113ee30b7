use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for StatsError {
    fn from(err: sqlx::Error) -> Self {
        StatsError::Repository(err.to_string())
    }
}
