use crate::modules::live_roster::adapters::outbound::product_cache::ProductCache;
use crate::modules::live_roster::core::events::{PushEvent, RoomEvent, RosterEvent};
use crate::modules::live_roster::store::RosterStore;
use crate::shared::infrastructure::realtime::frames::decode_frame;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Applied(&'static str),
    Unchanged,
    ForeignRoom,
    Ignored,
    Malformed,
}

/// Maps push frames onto store mutations for the store's room.
pub struct RoomEventRouter {
    store: Arc<RosterStore>,
    cache: Arc<ProductCache>,
}

impl RoomEventRouter {
    pub fn new(store: Arc<RosterStore>, cache: Arc<ProductCache>) -> Self {
        Self { store, cache }
    }

    pub async fn route_frame(&self, text: &str) -> RouteOutcome {
        match decode_frame(text) {
            Ok(Some(event)) => self.route(event).await,
            Ok(None) => {
                debug!("ignoring realtime event outside the roster");
                RouteOutcome::Ignored
            }
            Err(error) => {
                warn!(room_id = %self.store.room_id(), %error, "dropping malformed push event");
                RouteOutcome::Malformed
            }
        }
    }

    pub async fn route(&self, event: RoomEvent) -> RouteOutcome {
        let room_id = self.store.room_id();
        if !event.room_id.eq_ignore_ascii_case(room_id.as_str()) {
            debug!(%room_id, other = %event.room_id, "ignoring push for another room");
            return RouteOutcome::ForeignRoom;
        }
        let event = match event.push {
            PushEvent::ProductAdded(incoming) => {
                RosterEvent::Added(self.cache.resolve(incoming).await)
            }
            PushEvent::ProductRemoved(target) => RosterEvent::Removed(target),
            PushEvent::ProductPinned(target) => RosterEvent::Pinned(target),
            PushEvent::ProductUnpinned(target) => RosterEvent::Unpinned(target),
        };
        let kind = event.kind();
        if self.store.apply(event) {
            RouteOutcome::Applied(kind)
        } else {
            RouteOutcome::Unchanged
        }
    }
}
