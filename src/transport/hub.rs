use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, warn};

use super::{
    listener::Listener,
    models::{Announcement, ButtonAction, InboundEvent, MessageHandle, OutboundEvent},
    ChannelId, Transport, TransportError,
};

const INBOUND_CAPACITY: usize = 1024;
const CHANNEL_CAPACITY: usize = 100;

/// In-process transport: every channel is a pair of broadcast queues
///
/// All inbound traffic goes through a single queue so listeners spanning
/// several channels see events in the exact order they were published.
#[derive(Debug, Clone)]
pub struct ChannelHub {
    inbound: broadcast::Sender<InboundEvent>,
    /// channel_id -> outbound sender
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<OutboundEvent>>>>,
    next_message_id: Arc<AtomicU64>,
}

impl Default for ChannelHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelHub {
    pub fn new() -> Self {
        let (inbound, _) = broadcast::channel(INBOUND_CAPACITY);
        Self {
            inbound,
            channels: Arc::new(RwLock::new(HashMap::new())),
            next_message_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// A player posted a chat message in a channel
    pub async fn publish_message(&self, channel_id: &str, author: &str, content: &str) -> u64 {
        let message_id = self.allocate_message_id();

        let _ = self.inbound.send(InboundEvent::Message {
            channel_id: channel_id.to_string(),
            message_id,
            author: author.to_string(),
            content: content.to_string(),
            received_at: Utc::now(),
        });

        self.emit_to_channel(
            channel_id,
            OutboundEvent::Chat {
                message_id,
                author: author.to_string(),
                content: content.to_string(),
            },
        )
        .await;

        message_id
    }

    /// A player pressed a button under a message in a channel
    pub fn press_button(&self, channel_id: &str, author: &str, action: ButtonAction) {
        let _ = self.inbound.send(InboundEvent::Button {
            channel_id: channel_id.to_string(),
            author: author.to_string(),
            action,
            received_at: Utc::now(),
        });
    }

    /// Subscribe to what is shown in a channel
    pub async fn subscribe_channel(&self, channel_id: &str) -> broadcast::Receiver<OutboundEvent> {
        self.channel_sender(channel_id).await.subscribe()
    }

    /// Forgets a channel once nobody is subscribed to it anymore
    pub async fn prune_channel(&self, channel_id: &str) {
        let mut channels = self.channels.write().await;
        let unused = channels
            .get(channel_id)
            .is_some_and(|sender| sender.receiver_count() == 0);
        if unused {
            channels.remove(channel_id);
            debug!(channel_id = %channel_id, "Removed channel without subscribers");
        }
    }

    #[cfg(test)]
    pub(crate) async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }

    fn allocate_message_id(&self) -> u64 {
        self.next_message_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn channel_sender(&self, channel_id: &str) -> broadcast::Sender<OutboundEvent> {
        {
            let channels = self.channels.read().await;
            if let Some(sender) = channels.get(channel_id) {
                return sender.clone();
            }
        }

        debug!(channel_id = %channel_id, "Creating new channel");
        let mut channels = self.channels.write().await;
        channels
            .entry(channel_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Channels are only created by subscribers; events for a channel nobody
    /// watches are dropped
    async fn emit_to_channel(&self, channel_id: &str, event: OutboundEvent) {
        let Some(sender) = self.channels.read().await.get(channel_id).cloned() else {
            debug!(channel_id = %channel_id, "Channel event emitted with no receivers");
            return;
        };
        match sender.send(event) {
            Ok(receiver_count) => {
                debug!(
                    channel_id = %channel_id,
                    receivers = receiver_count,
                    "Channel event emitted"
                );
            }
            Err(_) => {
                debug!(channel_id = %channel_id, "Channel event emitted with no receivers");
            }
        }
    }
}

#[async_trait]
impl Transport for ChannelHub {
    async fn announce(
        &self,
        channel_id: &str,
        announcement: Announcement,
    ) -> Result<MessageHandle, TransportError> {
        let handle = MessageHandle {
            channel_id: channel_id.to_string(),
            message_id: self.allocate_message_id(),
        };

        self.emit_to_channel(
            channel_id,
            OutboundEvent::Announced {
                handle: handle.clone(),
                announcement,
            },
        )
        .await;

        Ok(handle)
    }

    async fn retract(&self, handle: &MessageHandle) -> Result<(), TransportError> {
        self.emit_to_channel(
            &handle.channel_id,
            OutboundEvent::Retracted {
                handle: handle.clone(),
            },
        )
        .await;
        Ok(())
    }

    async fn listen(&self, sources: &[ChannelId]) -> Result<Listener, TransportError> {
        if sources.is_empty() {
            return Err(TransportError::NoSources);
        }

        let mut inbound = self.inbound.subscribe();
        let sources: Vec<ChannelId> = sources.to_vec();
        let (sender, receiver) = mpsc::unbounded_channel();

        let pump = tokio::spawn(async move {
            loop {
                match inbound.recv().await {
                    Ok(event) => {
                        if !sources.iter().any(|source| source == event.channel_id()) {
                            continue;
                        }
                        if sender.send(event).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Listener lagged behind inbound events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Ok(Listener::with_pump(receiver, pump))
    }
}
