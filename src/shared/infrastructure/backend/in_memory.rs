use crate::modules::live_roster::core::entry::{
    IncomingEntry, ProductRef, ProductSummary, RosterEntry,
};
use crate::shared::core::primitives::{ProductId, RoomId};
use crate::shared::infrastructure::backend::wire::entry_json;
use crate::shared::infrastructure::backend::{BackendError, ProductCatalog, RosterBackend};
use crate::shared::infrastructure::realtime::frames::{
    PRODUCT_ADDED, PRODUCT_PINNED, PRODUCT_REMOVED, PRODUCT_UNPINNED, push_frame,
};
use crate::shared::infrastructure::realtime::in_memory::InMemoryRealtime;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    FetchRoster { room_id: String },
    Add { room_id: String, product_id: String },
    Remove { room_id: String, product_id: String },
    Pin { room_id: String, product_id: String },
    Unpin { room_id: String, product_id: String },
    Search { query: String },
    ListProducts,
}

/// Backend double that keeps rooms in memory and, when given a hub, publishes the
/// same push events the real server would after each successful mutation.
#[derive(Default)]
pub struct InMemoryRosterBackend {
    rooms: RwLock<HashMap<String, Vec<RosterEntry>>>,
    products: RwLock<Vec<ProductSummary>>,
    calls: Mutex<Vec<BackendCall>>,
    rejection: Mutex<Option<String>>,
    search_delays: Mutex<HashMap<String, Duration>>,
    fetch_delay: Mutex<Option<Duration>>,
    realtime: Option<InMemoryRealtime>,
    next_entry: AtomicU64,
    is_offline: AtomicBool,
}

impl InMemoryRosterBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_broadcast(realtime: InMemoryRealtime) -> Self {
        Self {
            realtime: Some(realtime),
            ..Self::default()
        }
    }

    pub fn toggle_offline(&self) {
        self.is_offline.fetch_xor(true, Ordering::SeqCst);
    }

    pub async fn seed_room(&self, room_id: &str, entries: Vec<RosterEntry>) {
        self.rooms.write().await.insert(room_id.to_string(), entries);
    }

    pub async fn seed_products(&self, products: Vec<ProductSummary>) {
        self.products.write().await.extend(products);
    }

    /// Every following request is refused with this message until cleared with `None`.
    pub async fn reject_with(&self, message: Option<&str>) {
        *self.rejection.lock().await = message.map(str::to_owned);
    }

    pub async fn set_search_delay(&self, query: &str, delay: Duration) {
        self.search_delays
            .lock()
            .await
            .insert(query.to_string(), delay);
    }

    pub async fn set_fetch_delay(&self, delay: Option<Duration>) {
        *self.fetch_delay.lock().await = delay;
    }

    pub async fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().await.clone()
    }

    pub async fn room(&self, room_id: &str) -> Vec<RosterEntry> {
        self.rooms
            .read()
            .await
            .get(room_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn record(&self, call: BackendCall) -> Result<(), BackendError> {
        self.calls.lock().await.push(call);
        if self.is_offline.load(Ordering::SeqCst) {
            return Err(BackendError::Network("Backend offline".into()));
        }
        if let Some(message) = self.rejection.lock().await.clone() {
            return Err(BackendError::Rejected {
                status: Some(400),
                message: Some(message),
            });
        }
        Ok(())
    }

    async fn broadcast(&self, frame: String) {
        if let Some(realtime) = &self.realtime {
            realtime.publish(frame).await;
        }
    }

    /// Flips the pin flag of the active entry for `product_id`; pinning clears every other pin.
    async fn set_pinned(
        &self,
        room_id: &RoomId,
        product_id: &ProductId,
        pinned: bool,
    ) -> Result<String, BackendError> {
        let mut rooms = self.rooms.write().await;
        let entries = rooms.entry(room_id.to_string()).or_default();
        let target = active_entry(entries, product_id)?;
        for (index, entry) in entries.iter_mut().enumerate() {
            if index == target {
                entry.is_pinned = pinned;
            } else if pinned {
                entry.is_pinned = false;
            }
        }
        Ok(entries[target].entry_id.clone())
    }
}

fn not_found(message: &str) -> BackendError {
    BackendError::Rejected {
        status: Some(404),
        message: Some(message.to_string()),
    }
}

fn active_entry(entries: &[RosterEntry], product_id: &ProductId) -> Result<usize, BackendError> {
    entries
        .iter()
        .position(|entry| entry.is_active && entry.product_id() == product_id.as_str())
        .ok_or_else(|| not_found("Product not in livestream"))
}

#[async_trait]
impl RosterBackend for InMemoryRosterBackend {
    async fn fetch_roster(&self, room_id: &RoomId) -> Result<Vec<IncomingEntry>, BackendError> {
        self.record(BackendCall::FetchRoster {
            room_id: room_id.to_string(),
        })
        .await?;
        let delay = *self.fetch_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .room(room_id.as_str())
            .await
            .into_iter()
            .map(|entry| IncomingEntry {
                product: ProductRef::Bare(entry.product.product_id),
                entry_id: entry.entry_id,
                is_pinned: entry.is_pinned,
                is_active: entry.is_active,
                added_at: entry.added_at,
                added_by: entry.added_by,
            })
            .collect())
    }

    async fn add_product(
        &self,
        room_id: &RoomId,
        product_id: &ProductId,
    ) -> Result<(), BackendError> {
        self.record(BackendCall::Add {
            room_id: room_id.to_string(),
            product_id: product_id.to_string(),
        })
        .await?;

        let product = self
            .products
            .read()
            .await
            .iter()
            .find(|product| product.product_id == product_id.as_str())
            .cloned()
            .ok_or_else(|| not_found("Product not found"))?;

        let entry = {
            let mut rooms = self.rooms.write().await;
            let entries = rooms.entry(room_id.to_string()).or_default();
            if active_entry(entries, product_id).is_ok() {
                return Err(BackendError::Rejected {
                    status: Some(409),
                    message: Some("Product already in livestream".into()),
                });
            }
            let entry = RosterEntry {
                entry_id: format!("{:024x}", self.next_entry.fetch_add(1, Ordering::SeqCst) + 1),
                product,
                is_pinned: false,
                is_active: true,
                added_at: Utc::now().timestamp_millis(),
                added_by: None,
            };
            entries.push(entry.clone());
            entry
        };

        self.broadcast(push_frame(
            PRODUCT_ADDED,
            json!({ "roomId": room_id.as_str(), "entry": entry_json(&entry) }),
        ))
        .await;
        Ok(())
    }

    async fn remove_product(
        &self,
        room_id: &RoomId,
        product_id: &ProductId,
    ) -> Result<(), BackendError> {
        self.record(BackendCall::Remove {
            room_id: room_id.to_string(),
            product_id: product_id.to_string(),
        })
        .await?;

        let removed = {
            let mut rooms = self.rooms.write().await;
            let entries = rooms.entry(room_id.to_string()).or_default();
            let index = active_entry(entries, product_id)?;
            entries.remove(index)
        };

        self.broadcast(push_frame(
            PRODUCT_REMOVED,
            json!({
                "roomId": room_id.as_str(),
                "entryId": removed.entry_id,
                "productId": product_id.as_str(),
            }),
        ))
        .await;
        Ok(())
    }

    async fn pin_product(
        &self,
        room_id: &RoomId,
        product_id: &ProductId,
    ) -> Result<(), BackendError> {
        self.record(BackendCall::Pin {
            room_id: room_id.to_string(),
            product_id: product_id.to_string(),
        })
        .await?;
        let entry_id = self.set_pinned(room_id, product_id, true).await?;
        self.broadcast(push_frame(
            PRODUCT_PINNED,
            json!({
                "roomId": room_id.as_str(),
                "entryId": entry_id,
                "productId": product_id.as_str(),
            }),
        ))
        .await;
        Ok(())
    }

    async fn unpin_product(
        &self,
        room_id: &RoomId,
        product_id: &ProductId,
    ) -> Result<(), BackendError> {
        self.record(BackendCall::Unpin {
            room_id: room_id.to_string(),
            product_id: product_id.to_string(),
        })
        .await?;
        let entry_id = self.set_pinned(room_id, product_id, false).await?;
        self.broadcast(push_frame(
            PRODUCT_UNPINNED,
            json!({
                "roomId": room_id.as_str(),
                "entryId": entry_id,
                "productId": product_id.as_str(),
            }),
        ))
        .await;
        Ok(())
    }
}

#[async_trait]
impl ProductCatalog for InMemoryRosterBackend {
    async fn search_products(&self, query: &str) -> Result<Vec<ProductSummary>, BackendError> {
        self.record(BackendCall::Search {
            query: query.to_string(),
        })
        .await?;
        let delay = self.search_delays.lock().await.get(query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let needle = query.to_lowercase();
        Ok(self
            .products
            .read()
            .await
            .iter()
            .filter(|product| product.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn list_products(&self) -> Result<Vec<ProductSummary>, BackendError> {
        self.record(BackendCall::ListProducts).await?;
        Ok(self.products.read().await.clone())
    }
}

#[cfg(test)]
mod in_memory_roster_backend_tests {
    use super::*;
    use crate::shared::infrastructure::realtime::RealtimeTransport;
    use crate::shared::infrastructure::realtime::frames::decode_frame;
    use crate::modules::live_roster::core::events::PushEvent;
    use crate::tests::fixtures::entries::{PRODUCT_ID, ROOM_ID, RosterEntryBuilder, entry};
    use rstest::{fixture, rstest};

    type BeforeEachReturn = (RoomId, ProductId, InMemoryRosterBackend);

    #[fixture]
    fn before_each() -> BeforeEachReturn {
        (
            RoomId::parse(ROOM_ID).unwrap(),
            ProductId::parse(PRODUCT_ID).unwrap(),
            InMemoryRosterBackend::new(),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_serve_the_room_with_bare_product_refs(before_each: BeforeEachReturn) {
        let (room_id, _, backend) = before_each;
        backend.seed_room(ROOM_ID, vec![entry("e1", 1)]).await;
        let entries = backend.fetch_roster(&room_id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].product, ProductRef::Bare("product-e1".into()));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_add_and_broadcast_the_new_entry(before_each: BeforeEachReturn) {
        let (room_id, product_id, _) = before_each;
        let hub = InMemoryRealtime::new();
        let backend = InMemoryRosterBackend::with_broadcast(hub.clone());
        backend
            .seed_products(vec![RosterEntryBuilder::new().build().product])
            .await;
        let mut listener = hub.connect().await.unwrap();

        backend.add_product(&room_id, &product_id).await.unwrap();

        let frame = listener.next_frame().await.unwrap().unwrap();
        let event = decode_frame(&frame).unwrap().unwrap();
        assert_eq!(event.room_id, ROOM_ID);
        assert!(matches!(
            event.push,
            PushEvent::ProductAdded(ref incoming) if incoming.product.product_id() == PRODUCT_ID
        ));
        assert_eq!(backend.room(ROOM_ID).await.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_refuse_a_second_active_entry_for_the_same_product(
        before_each: BeforeEachReturn,
    ) {
        let (room_id, product_id, backend) = before_each;
        backend
            .seed_products(vec![RosterEntryBuilder::new().build().product])
            .await;
        backend.add_product(&room_id, &product_id).await.unwrap();
        let err = backend.add_product(&room_id, &product_id).await.unwrap_err();
        assert_eq!(err.server_message(), Some("Product already in livestream"));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_keep_a_single_pin_per_room(before_each: BeforeEachReturn) {
        let (room_id, _, backend) = before_each;
        backend
            .seed_room(
                ROOM_ID,
                vec![
                    RosterEntryBuilder::new()
                        .entry_id("e1")
                        .product_id("64b7e2a9c1d2e3f4a5b6c7d1")
                        .pinned(true)
                        .build(),
                    RosterEntryBuilder::new()
                        .entry_id("e2")
                        .product_id("64b7e2a9c1d2e3f4a5b6c7d2")
                        .build(),
                ],
            )
            .await;
        let second = ProductId::parse("64b7e2a9c1d2e3f4a5b6c7d2").unwrap();
        backend.pin_product(&room_id, &second).await.unwrap();
        let pinned: Vec<_> = backend
            .room(ROOM_ID)
            .await
            .into_iter()
            .filter(|e| e.is_pinned)
            .map(|e| e.entry_id)
            .collect();
        assert_eq!(pinned, vec!["e2".to_string()]);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_record_calls_even_when_offline(before_each: BeforeEachReturn) {
        let (room_id, product_id, backend) = before_each;
        backend.toggle_offline();
        let result = backend.remove_product(&room_id, &product_id).await;
        assert_eq!(result, Err(BackendError::Network("Backend offline".into())));
        assert_eq!(
            backend.calls().await,
            vec![BackendCall::Remove {
                room_id: ROOM_ID.into(),
                product_id: PRODUCT_ID.into()
            }]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_with_the_configured_message(before_each: BeforeEachReturn) {
        let (room_id, _, backend) = before_each;
        backend.reject_with(Some("Livestream ended")).await;
        let err = backend.fetch_roster(&room_id).await.unwrap_err();
        assert_eq!(err.server_message(), Some("Livestream ended"));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_search_by_name_ignoring_case(before_each: BeforeEachReturn) {
        let (_, _, backend) = before_each;
        backend
            .seed_products(vec![
                RosterEntryBuilder::new().name("Ceramic Mug").build().product,
                RosterEntryBuilder::new()
                    .product_id("64b7e2a9c1d2e3f4a5b6c7d1")
                    .name("Desk Lamp")
                    .build()
                    .product,
            ])
            .await;
        let found = backend.search_products("MUG").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ceramic Mug");
        assert_eq!(backend.list_products().await.unwrap().len(), 2);
    }
}
