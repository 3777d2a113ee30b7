// Public API
pub use handler::{websocket_handler, ChannelMessageHandler};
pub use messages::{MessageType, WebSocketMessage};
pub use socket::{Connection, MessageHandler, SocketWrapper};

// Internal modules
mod handler;
pub mod messages;
mod socket;
