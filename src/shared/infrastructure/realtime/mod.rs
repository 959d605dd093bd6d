// Ports for the publish/subscribe realtime channel.
//
// Purpose
// - Let the room supervisor open connections, send control messages and read
//   text frames without knowing the socket library.
//
// Boundaries
// - `websocket` talks to the real server; `in_memory` is a hub for tests.

use crate::shared::core::primitives::RoomId;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("send failed: {0}")]
    Send(String),

    #[error("receive failed: {0}")]
    Receive(String),
}

/// Client to server control frames: `{"event": "join_room", "data": {"roomId": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ControlMessage {
    JoinRoom {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    LeaveRoom {
        #[serde(rename = "roomId")]
        room_id: String,
    },
}

impl ControlMessage {
    pub fn join(room_id: &RoomId) -> Self {
        ControlMessage::JoinRoom {
            room_id: room_id.to_string(),
        }
    }

    pub fn leave(room_id: &RoomId) -> Self {
        ControlMessage::LeaveRoom {
            room_id: room_id.to_string(),
        }
    }

    pub fn encode(&self) -> Result<String, TransportError> {
        serde_json::to_string(self).map_err(|e| TransportError::Send(e.to_string()))
    }
}

#[async_trait]
pub trait RealtimeTransport: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn RealtimeConnection>, TransportError>;
}

#[async_trait]
pub trait RealtimeConnection: Send {
    async fn send(&mut self, message: &ControlMessage) -> Result<(), TransportError>;

    /// Next text frame. `None` once the peer has closed the connection.
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>>;

    async fn close(&mut self) -> Result<(), TransportError>;
}

pub mod frames;
pub mod in_memory;
pub mod websocket;
