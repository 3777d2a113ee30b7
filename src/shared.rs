use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::catalog::RecipeSource;
use crate::render::GridRenderer;
use crate::round::RoundEngine;
use crate::session::{SessionCoordinator, SessionError, SessionTiming};
use crate::stats::{StatsAggregator, StatsError};
use crate::transport::ChannelHub;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub recipes: Arc<dyn RecipeSource>,
    pub renderer: Arc<dyn GridRenderer>,
    pub hub: ChannelHub,
    pub stats: Arc<StatsAggregator>,
    pub timing: SessionTiming,
    pub default_duel_rounds: u32,
}

impl AppState {
    pub fn new(
        recipes: Arc<dyn RecipeSource>,
        renderer: Arc<dyn GridRenderer>,
        hub: ChannelHub,
        stats: Arc<StatsAggregator>,
        timing: SessionTiming,
        default_duel_rounds: u32,
    ) -> Self {
        Self {
            recipes,
            renderer,
            hub,
            stats,
            timing,
            default_duel_rounds,
        }
    }

    /// Coordinator wired to the hub, renderer, recipes and stats of this process
    pub fn coordinator(&self) -> SessionCoordinator {
        let engine = RoundEngine::new(
            Arc::new(self.hub.clone()),
            Arc::clone(&self.renderer),
            Arc::clone(&self.recipes),
        );
        SessionCoordinator::new(engine, Arc::clone(&self.stats), self.timing)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<StatsError> for AppError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::Validation(msg) => AppError::BadRequest(msg),
            StatsError::Repository(msg) => AppError::DatabaseError(msg),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
