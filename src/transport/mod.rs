// Messaging transport between the game core and the chat surface.
//
// The core only announces messages, retracts them, and listens to inbound
// chat messages and button presses. How these reach players is up to the
// implementation; the in-process hub backs the WebSocket surface and tests.

pub use hub::ChannelHub;
pub use listener::Listener;
pub use models::{
    Announcement, AnnouncementKind, Attachment, ButtonAction, InboundEvent, MessageHandle,
    OutboundEvent, Player, PlayerId,
};

mod hub;
mod listener;
mod models;

use async_trait::async_trait;
use thiserror::Error;

pub type ChannelId = String;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("No source to listen to")]
    NoSources,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Posts a message to a channel and returns a handle to it
    async fn announce(
        &self,
        channel_id: &str,
        announcement: Announcement,
    ) -> Result<MessageHandle, TransportError>;

    /// Removes a previously announced message
    async fn retract(&self, handle: &MessageHandle) -> Result<(), TransportError>;

    /// Opens one listener over every source. Events from all sources are
    /// delivered in the order they reached the transport.
    async fn listen(&self, sources: &[ChannelId]) -> Result<Listener, TransportError>;
}
