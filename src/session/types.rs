use serde::{Deserialize, Serialize};

use super::models::SessionKind;
use crate::transport::Player;

/// Player as sent by the chat surface
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerRef {
    pub player_id: String,
    pub username: String,
}

impl From<PlayerRef> for Player {
    fn from(player: PlayerRef) -> Self {
        Player::new(player.player_id, player.username)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoloGameRequest {
    pub player: PlayerRef,
    pub channel_id: String,
    /// Defaults to a single round
    pub rounds: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuelGameRequest {
    pub challenger: PlayerRef,
    pub opponent: PlayerRef,
    pub channel_id: String,
    pub rounds: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomGameRequest {
    /// Players in join order
    pub players: Vec<PlayerRef>,
    pub max_players: usize,
    pub rounds: u32,
    pub channel_id: String,
    pub thread_id: Option<String>,
    /// Overrides the default answer window
    pub round_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionCreatedResponse {
    pub session_id: String,
    pub kind: SessionKind,
    pub rounds_total: u32,
    pub players: Vec<Player>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_request_thread_is_optional() {
        let request: RoomGameRequest = serde_json::from_str(
            r#"{
                "players": [{"player_id": "1", "username": "alice"}],
                "max_players": 4,
                "rounds": 3,
                "channel_id": "general"
            }"#,
        )
        .unwrap();

        assert!(request.thread_id.is_none());
        assert!(request.round_seconds.is_none());
    }

    #[test]
    fn created_response_serializes_kind_in_snake_case() {
        let response = SessionCreatedResponse {
            session_id: "s".to_string(),
            kind: SessionKind::Duel,
            rounds_total: 5,
            players: vec![],
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""kind":"duel""#));
    }
}
