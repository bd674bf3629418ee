use serde::Serialize;
use tokio::sync::broadcast;

use crate::domain::repository::Notifier;
use crate::domain::types::Room;

const CHANNEL_CAPACITY: usize = 256;

/// One event addressed to a room. Serialized as-is onto each subscribed socket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomEvent {
    pub event: String,
    pub room: String,
    pub data: serde_json::Value,
}

/// Process-wide fan-out of room events to connected sockets.
///
/// Every socket holds its own receiver and filters by the rooms it joined.
#[derive(Clone)]
pub struct RealtimeHub {
    tx: broadcast::Sender<RoomEvent>,
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.tx.subscribe()
    }
}

impl Notifier for RealtimeHub {
    fn publish(&self, room: &Room, event: &str, data: serde_json::Value) {
        let room = room.to_string();
        // Err only means nobody is listening.
        match self.tx.send(RoomEvent {
            event: event.to_owned(),
            room: room.clone(),
            data,
        }) {
            Ok(receivers) => tracing::debug!(%room, event, receivers, "room event published"),
            Err(_) => tracing::trace!(%room, event, "room event dropped, no listeners"),
        }
    }
}
