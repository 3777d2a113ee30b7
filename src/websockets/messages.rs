use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::{LeaderboardAction, LeaderboardPage};
use crate::transport::{Announcement, ButtonAction, OutboundEvent};

/// Message types for WebSocket communication
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    // Client -> Server (CHAT is also echoed back to the channel)
    Chat,
    Button,
    Leaderboard,

    // Server -> Client
    Announcement,
    Retracted,
    LeaderboardPage,
    Error,
}

/// Metadata for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
    pub player_id: Option<String>,
}

/// Base structure for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub payload: serde_json::Value,
    pub meta: Option<WebSocketMessageMeta>,
}

/// Client-to-Server message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPayload {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonPayload {
    pub action: ButtonAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardPayload {
    pub action: LeaderboardAction,
}

/// Server-to-Client message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPostedPayload {
    pub message_id: u64,
    pub author: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementPayload {
    pub message_id: u64,
    #[serde(flatten)]
    pub announcement: Announcement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetractedPayload {
    pub message_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: serde_json::Value) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
                player_id: None,
            }),
        }
    }

    fn with_payload<T: Serialize>(message_type: MessageType, payload: &T) -> Self {
        Self::new(
            message_type,
            serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        )
    }

    /// Create an ERROR message
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_payload(
            MessageType::Error,
            &ErrorPayload {
                message: message.into(),
            },
        )
    }

    /// Create a LEADERBOARD_PAGE message
    pub fn leaderboard_page(page: &LeaderboardPage) -> Self {
        Self::with_payload(MessageType::LeaderboardPage, page)
    }

    /// Frame for something shown in a channel
    pub fn from_outbound(event: OutboundEvent) -> Self {
        match event {
            OutboundEvent::Announced {
                handle,
                announcement,
            } => Self::with_payload(
                MessageType::Announcement,
                &AnnouncementPayload {
                    message_id: handle.message_id,
                    announcement,
                },
            ),
            OutboundEvent::Retracted { handle } => Self::with_payload(
                MessageType::Retracted,
                &RetractedPayload {
                    message_id: handle.message_id,
                },
            ),
            OutboundEvent::Chat {
                message_id,
                author,
                content,
            } => Self::with_payload(
                MessageType::Chat,
                &ChatPostedPayload {
                    message_id,
                    author,
                    content,
                },
            ),
        }
    }

    /// Decodes the payload into the shape its type announces
    pub fn decode_payload<T: serde::de::DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload)
    }
}
