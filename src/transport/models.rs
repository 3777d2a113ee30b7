use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

pub type PlayerId = String;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }

    /// Chat mention for the player
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// Buttons rendered next to game messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ButtonAction {
    /// Solo mode: abandon the current recipe and draw another one
    Rerun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnouncementKind {
    SessionStarting,
    RoundStarted,
    RoundWon,
    RoundTimedOut,
    GuessRejected,
    RoundFailed,
    SessionResult,
    SessionSummary,
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub kind: AnnouncementKind,
    pub content: String,
    pub attachments: Vec<Attachment>,
    /// Buttons shown under the message
    pub buttons: Vec<ButtonAction>,
    /// Message this one answers, if any
    pub reply_to: Option<u64>,
}

impl Announcement {
    pub fn new(kind: AnnouncementKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            attachments: Vec::new(),
            buttons: Vec::new(),
            reply_to: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_button(mut self, button: ButtonAction) -> Self {
        self.buttons.push(button);
        self
    }

    pub fn replying_to(mut self, message_id: u64) -> Self {
        self.reply_to = Some(message_id);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHandle {
    pub channel_id: String,
    pub message_id: u64,
}

/// Something a player did in a listened channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Message {
        channel_id: String,
        message_id: u64,
        author: PlayerId,
        content: String,
        received_at: DateTime<Utc>,
    },
    Button {
        channel_id: String,
        author: PlayerId,
        action: ButtonAction,
        received_at: DateTime<Utc>,
    },
}

impl InboundEvent {
    pub fn channel_id(&self) -> &str {
        match self {
            InboundEvent::Message { channel_id, .. } => channel_id,
            InboundEvent::Button { channel_id, .. } => channel_id,
        }
    }

    pub fn author(&self) -> &str {
        match self {
            InboundEvent::Message { author, .. } => author,
            InboundEvent::Button { author, .. } => author,
        }
    }
}

/// What the hub pushes to the clients of a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    Announced {
        handle: MessageHandle,
        announcement: Announcement,
    },
    Retracted {
        handle: MessageHandle,
    },
    /// A player's chat message, echoed so everybody in the channel sees it
    Chat {
        message_id: u64,
        author: PlayerId,
        content: String,
    },
}
