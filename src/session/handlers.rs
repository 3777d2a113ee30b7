use axum::{extract::State, http::StatusCode, Json};
use std::time::Duration;
use tracing::{info, instrument};

use super::{
    models::SessionConfig,
    types::{DuelGameRequest, RoomGameRequest, SessionCreatedResponse, SoloGameRequest},
};
use crate::shared::{AppError, AppState};
use crate::transport::Player;

const DEFAULT_SOLO_ROUNDS: u32 = 1;

/// HTTP handler starting a solo game
///
/// POST /games/solo
#[instrument(name = "start_solo", skip(state))]
pub async fn start_solo(
    State(state): State<AppState>,
    Json(request): Json<SoloGameRequest>,
) -> Result<(StatusCode, Json<SessionCreatedResponse>), AppError> {
    let config = SessionConfig::solo(
        request.player.into(),
        request.channel_id,
        request.rounds.unwrap_or(DEFAULT_SOLO_ROUNDS),
        state.timing.round_duration,
    )?;

    Ok(spawn_session(&state, config))
}

/// HTTP handler starting a duel once the opponent accepted
///
/// POST /games/duel
#[instrument(name = "start_duel", skip(state))]
pub async fn start_duel(
    State(state): State<AppState>,
    Json(request): Json<DuelGameRequest>,
) -> Result<(StatusCode, Json<SessionCreatedResponse>), AppError> {
    let config = SessionConfig::duel(
        request.challenger.into(),
        request.opponent.into(),
        request.channel_id,
        request.rounds.unwrap_or(state.default_duel_rounds),
        state.timing.round_duration,
    )?;

    Ok(spawn_session(&state, config))
}

/// HTTP handler starting a room game with the players who joined its lobby
///
/// POST /games/room
#[instrument(name = "start_room", skip(state))]
pub async fn start_room(
    State(state): State<AppState>,
    Json(request): Json<RoomGameRequest>,
) -> Result<(StatusCode, Json<SessionCreatedResponse>), AppError> {
    let round_duration = request
        .round_seconds
        .map_or(state.timing.round_duration, Duration::from_secs);

    let config = SessionConfig::room(
        request.players.into_iter().map(Player::from).collect(),
        request.max_players,
        request.channel_id,
        request.thread_id,
        request.rounds,
        round_duration,
    )?;

    Ok(spawn_session(&state, config))
}

fn spawn_session(
    state: &AppState,
    config: SessionConfig,
) -> (StatusCode, Json<SessionCreatedResponse>) {
    let response = SessionCreatedResponse {
        session_id: config.session_id.clone(),
        kind: config.kind,
        rounds_total: config.rounds_total,
        players: config.players.clone(),
    };

    info!(
        session_id = %config.session_id,
        kind = %config.kind,
        players = config.players.len(),
        "Starting session"
    );

    let coordinator = state.coordinator();
    tokio::spawn(async move {
        let summary = coordinator.run(config).await;
        info!(
            session_id = %summary.session_id,
            warnings = summary.warnings.len(),
            "Session finished"
        );
    });

    (StatusCode::ACCEPTED, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionKind;
    use crate::shared::test_utils::AppStateBuilder;
    use crate::stats::{InMemoryStatsRepository, StatsRepository};
    use axum::{body::Body, http::Request, routing::post, Router};
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    fn router(state: AppState) -> Router {
        Router::new()
            .route("/games/solo", post(start_solo))
            .route("/games/duel", post(start_duel))
            .route("/games/room", post(start_room))
            .with_state(state)
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn solo_game_is_accepted_and_runs() {
        let repo = Arc::new(InMemoryStatsRepository::new());
        let state = AppStateBuilder::new()
            .with_stats_repository(repo.clone())
            .build();

        let (status, body) = post_json(
            router(state),
            "/games/solo",
            r#"{"player": {"player_id": "1", "username": "alice"}, "channel_id": "solo"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        let response: SessionCreatedResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.kind, SessionKind::Solo);
        assert_eq!(response.rounds_total, 1);
        assert!(!response.session_id.is_empty());

        // Nobody answers: the single round times out and the game is lost
        tokio::time::sleep(Duration::from_millis(600)).await;
        let stats = repo.get_player_stats("1").await.unwrap().unwrap();
        assert_eq!(stats.total_games_played, 1);
        assert_eq!(stats.total_losses, 1);
        assert_eq!(stats.total_losses_rounds, 1);
    }

    #[tokio::test]
    async fn duel_uses_default_rounds() {
        let state = AppStateBuilder::new().build();

        let (status, body) = post_json(
            router(state),
            "/games/duel",
            r#"{
                "challenger": {"player_id": "1", "username": "alice"},
                "opponent": {"player_id": "2", "username": "bob"},
                "channel_id": "duel"
            }"#,
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        let response: SessionCreatedResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.rounds_total, 2);
        assert_eq!(response.players.len(), 2);
    }

    #[tokio::test]
    async fn duel_against_oneself_is_a_bad_request() {
        let state = AppStateBuilder::new().build();

        let (status, _) = post_json(
            router(state),
            "/games/duel",
            r#"{
                "challenger": {"player_id": "1", "username": "alice"},
                "opponent": {"player_id": "1", "username": "alice"},
                "channel_id": "duel"
            }"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn full_room_is_a_bad_request() {
        let state = AppStateBuilder::new().build();

        let (status, _) = post_json(
            router(state),
            "/games/room",
            r#"{
                "players": [
                    {"player_id": "1", "username": "alice"},
                    {"player_id": "2", "username": "bob"},
                    {"player_id": "3", "username": "carol"}
                ],
                "max_players": 2,
                "rounds": 3,
                "channel_id": "room"
            }"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn room_rejects_zero_second_rounds() {
        let state = AppStateBuilder::new().build();

        let (status, _) = post_json(
            router(state),
            "/games/room",
            r#"{
                "players": [
                    {"player_id": "1", "username": "alice"},
                    {"player_id": "2", "username": "bob"}
                ],
                "max_players": 4,
                "rounds": 1,
                "channel_id": "room",
                "round_seconds": 0
            }"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn room_rejects_endless_rounds() {
        let repo = Arc::new(InMemoryStatsRepository::new());
        let state = AppStateBuilder::new()
            .with_stats_repository(repo.clone())
            .build();

        let (status, body) = post_json(
            router(state),
            "/games/room",
            r#"{
                "players": [
                    {"player_id": "1", "username": "alice"},
                    {"player_id": "2", "username": "bob"}
                ],
                "max_players": 4,
                "rounds": 1,
                "channel_id": "room",
                "round_seconds": 18446744073709551615
            }"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(error["error"].as_str().unwrap().contains("600"));
        // Nothing was started, so nobody got registered
        assert!(repo.get_player_stats("1").await.unwrap().is_none());
    }
}
