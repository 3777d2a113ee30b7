use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::shared::{AppError, AppState};
use crate::stats::{LeaderboardBrowser, StatsAggregator};
use crate::transport::{ChannelHub, OutboundEvent, Player};
use crate::websockets::messages::{
    ButtonPayload, ChatPayload, LeaderboardPayload, MessageType, WebSocketMessage,
};

use super::socket::{Connection, MessageHandler, SocketWrapper};

/// Routes frames sent by one connected player
///
/// Chat and button frames become inbound hub events; leaderboard frames move
/// this connection's own leaderboard cursor and are answered directly.
pub struct ChannelMessageHandler {
    hub: ChannelHub,
    stats: Arc<StatsAggregator>,
    leaderboard: Mutex<LeaderboardBrowser>,
    reply_sender: mpsc::UnboundedSender<String>,
}

impl ChannelMessageHandler {
    pub fn new(
        hub: ChannelHub,
        stats: Arc<StatsAggregator>,
        reply_sender: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            hub,
            stats,
            leaderboard: Mutex::new(LeaderboardBrowser::new()),
            reply_sender,
        }
    }

    fn reply(&self, message: &WebSocketMessage) {
        match serde_json::to_string(message) {
            Ok(json) => {
                let _ = self.reply_sender.send(json);
            }
            Err(e) => warn!(error = %e, "Failed to serialize reply"),
        }
    }

    async fn handle_frame(
        &self,
        player_id: &str,
        channel_id: &str,
        message: WebSocketMessage,
    ) -> Result<(), String> {
        match message.message_type {
            MessageType::Chat => {
                let payload: ChatPayload = message.decode_payload().map_err(|e| e.to_string())?;
                self.hub
                    .publish_message(channel_id, player_id, &payload.content)
                    .await;
            }
            MessageType::Button => {
                let payload: ButtonPayload =
                    message.decode_payload().map_err(|e| e.to_string())?;
                self.hub.press_button(channel_id, player_id, payload.action);
            }
            MessageType::Leaderboard => {
                let payload: LeaderboardPayload =
                    message.decode_payload().map_err(|e| e.to_string())?;
                let page = self
                    .leaderboard
                    .lock()
                    .await
                    .navigate(payload.action, &self.stats)
                    .await
                    .map_err(|e| e.to_string())?;
                self.reply(&WebSocketMessage::leaderboard_page(&page));
            }
            other => {
                debug!(message_type = ?other, "Ignoring server-only message type");
                return Err(format!("{:?} cannot be sent by clients", other));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MessageHandler for ChannelMessageHandler {
    async fn handle_message(&self, player_id: &str, channel_id: &str, message: String) {
        debug!(
            player_id = %player_id,
            channel_id = %channel_id,
            message = %message,
            "Received message"
        );

        let result = match serde_json::from_str::<WebSocketMessage>(&message) {
            Ok(ws_message) => self.handle_frame(player_id, channel_id, ws_message).await,
            Err(e) => Err(format!("Invalid message: {}", e)),
        };

        if let Err(error) = result {
            warn!(
                player_id = %player_id,
                channel_id = %channel_id,
                error = %error,
                "Rejected WebSocket message"
            );
            self.reply(&WebSocketMessage::error(error));
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub player_id: String,
    pub username: String,
}

/// WebSocket endpoint attaching a player to a channel
///
/// GET /ws/:channel_id?player_id=..&username=..
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(channel_id): Path<String>,
    Query(query): Query<ConnectQuery>,
    State(app_state): State<AppState>,
) -> Result<Response, AppError> {
    if query.player_id.trim().is_empty() {
        return Err(AppError::BadRequest("player_id cannot be empty".to_string()));
    }

    info!(
        channel_id = %channel_id,
        player_id = %query.player_id,
        "WebSocket connection requested"
    );

    let player = Player::new(query.player_id, query.username);
    Ok(ws.on_upgrade(move |socket| {
        handle_websocket_connection(Box::new(socket), channel_id, player, app_state)
    }))
}

/// Bridges one socket with the hub until the client disconnects
pub(crate) async fn handle_websocket_connection(
    socket: Box<dyn SocketWrapper>,
    channel_id: String,
    player: Player,
    app_state: AppState,
) {
    info!(
        channel_id = %channel_id,
        player_id = %player.id,
        username = %player.username,
        "WebSocket connection established"
    );

    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();

    let channel_events = app_state.hub.subscribe_channel(&channel_id).await;
    let forwarder = tokio::spawn(forward_channel_events(
        channel_id.clone(),
        channel_events,
        outbound_sender.clone(),
    ));

    let message_handler = Arc::new(ChannelMessageHandler::new(
        app_state.hub.clone(),
        Arc::clone(&app_state.stats),
        outbound_sender,
    ));

    let connection = Connection::new(
        player.id.clone(),
        channel_id.clone(),
        socket,
        outbound_receiver,
        message_handler,
    );

    match connection.run().await {
        Ok(()) => {
            info!(
                channel_id = %channel_id,
                player_id = %player.id,
                "WebSocket connection closed cleanly"
            );
        }
        Err(e) => {
            warn!(
                channel_id = %channel_id,
                player_id = %player.id,
                error = ?e,
                "WebSocket connection error"
            );
        }
    }

    forwarder.abort();
    let _ = forwarder.await;
    app_state.hub.prune_channel(&channel_id).await;
}

/// Turns what the hub shows in a channel into frames for one connection
async fn forward_channel_events(
    channel_id: String,
    mut events: broadcast::Receiver<OutboundEvent>,
    outbound_sender: mpsc::UnboundedSender<String>,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                let message = WebSocketMessage::from_outbound(event);
                let json = match serde_json::to_string(&message) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!(channel_id = %channel_id, error = %e, "Failed to serialize frame");
                        continue;
                    }
                };
                if outbound_sender.send(json).is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(channel_id = %channel_id, skipped, "Connection lagged behind channel");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
