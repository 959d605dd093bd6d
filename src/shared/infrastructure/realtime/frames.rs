// Server to client push frames: `{"event": "<name>", "data": {...}}`.
//
// Purpose
// - Turn one text frame into a room-scoped roster push, or nothing for events the
//   roster does not care about (chat, viewer counts).

use crate::modules::live_roster::core::events::{EntryTarget, PushEvent, RoomEvent};
use crate::shared::infrastructure::backend::wire::{DecodeError, WireEntry};
use serde::Deserialize;
use serde_json::{Value, json};

pub const PRODUCT_ADDED: &str = "product_added";
pub const PRODUCT_REMOVED: &str = "product_removed";
pub const PRODUCT_PINNED: &str = "product_pinned";
pub const PRODUCT_UNPINNED: &str = "product_unpinned";

#[derive(Debug, Deserialize)]
struct WireFrame {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePush {
    #[serde(default)]
    room_id: Option<String>,
    #[serde(default)]
    entry: Option<WireEntry>,
    #[serde(default)]
    entry_id: Option<String>,
    #[serde(default)]
    product_id: Option<String>,
}

impl WirePush {
    fn target(self, event: &str) -> Result<EntryTarget, DecodeError> {
        EntryTarget::new(self.entry_id, self.product_id).ok_or_else(|| {
            DecodeError::MissingIdentifier {
                event: event.to_string(),
            }
        })
    }
}

pub fn decode_frame(text: &str) -> Result<Option<RoomEvent>, DecodeError> {
    let frame: WireFrame =
        serde_json::from_str(text).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let event = frame.event.as_str();
    if ![PRODUCT_ADDED, PRODUCT_REMOVED, PRODUCT_PINNED, PRODUCT_UNPINNED].contains(&event) {
        return Ok(None);
    }

    let push: WirePush =
        serde_json::from_value(frame.data).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let room_id = push
        .room_id
        .clone()
        .filter(|room_id| !room_id.trim().is_empty())
        .ok_or_else(|| DecodeError::MissingRoom {
            event: event.to_string(),
        })?;

    let push = match event {
        PRODUCT_ADDED => {
            let entry = push.entry.ok_or_else(|| DecodeError::MissingEntry {
                event: event.to_string(),
            })?;
            PushEvent::ProductAdded(entry.try_into()?)
        }
        PRODUCT_REMOVED => PushEvent::ProductRemoved(push.target(event)?),
        PRODUCT_PINNED => PushEvent::ProductPinned(push.target(event)?),
        _ => PushEvent::ProductUnpinned(push.target(event)?),
    };
    Ok(Some(RoomEvent { room_id, push }))
}

pub fn push_frame(event: &str, data: Value) -> String {
    json!({ "event": event, "data": data }).to_string()
}
