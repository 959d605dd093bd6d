// One mounted roster view: the store, the action handlers, product search and the
// realtime supervisor for a single room, wired to the injected ports.
//
// Responsibilities
// - Mount: start room sync, warm the product cache, load the first snapshot.
// - Track every action in the store status and notify request failures.
// - Refetch the snapshot after every join that completes once the first fetch began.
// - Close: detach the store, then stop the supervisor (leave + close).

use crate::modules::live_roster::adapters::outbound::product_cache::ProductCache;
use crate::modules::live_roster::core::entry::ProductRef;
use crate::modules::live_roster::core::state::RosterState;
use crate::modules::live_roster::store::{RosterStatus, RosterStore, RosterView};
use crate::modules::live_roster::use_cases::add_product::command::AddProduct;
use crate::modules::live_roster::use_cases::add_product::handler::AddProductHandler;
use crate::modules::live_roster::use_cases::errors::{ActionError, ActionKind};
use crate::modules::live_roster::use_cases::refresh_roster::handler::RefreshRosterHandler;
use crate::modules::live_roster::use_cases::remove_product::command::RemoveProduct;
use crate::modules::live_roster::use_cases::remove_product::handler::RemoveProductHandler;
use crate::modules::live_roster::use_cases::search_products::handler::{
    DEFAULT_DEBOUNCE, ProductSearch, SearchOutcome, SearchResults,
};
use crate::modules::live_roster::use_cases::sync_room_events::backoff::ReconnectPolicy;
use crate::modules::live_roster::use_cases::sync_room_events::router::RoomEventRouter;
use crate::modules::live_roster::use_cases::sync_room_events::supervisor::{
    ConnectionState, RoomSyncSupervisor, SyncHandle, SyncStatus,
};
use crate::modules::live_roster::use_cases::toggle_pin::command::{PinAction, TogglePin};
use crate::modules::live_roster::use_cases::toggle_pin::handler::TogglePinHandler;
use crate::shared::core::primitives::{RoomId, ValidationError};
use crate::shared::infrastructure::backend::{ProductCatalog, RosterBackend};
use crate::shared::infrastructure::notifications::{Notification, Notifier};
use crate::shared::infrastructure::realtime::RealtimeTransport;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub search_debounce: Duration,
    pub reconnect: ReconnectPolicy,
    pub resync_on_rejoin: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            search_debounce: DEFAULT_DEBOUNCE,
            reconnect: ReconnectPolicy::default(),
            resync_on_rejoin: true,
        }
    }
}

#[derive(Clone)]
pub struct SessionPorts {
    pub backend: Arc<dyn RosterBackend>,
    pub catalog: Arc<dyn ProductCatalog>,
    pub transport: Arc<dyn RealtimeTransport>,
    pub notifier: Arc<dyn Notifier>,
}

#[derive(Clone)]
struct ActionTracker {
    store: Arc<RosterStore>,
    notifier: Arc<dyn Notifier>,
}

impl ActionTracker {
    async fn track<T>(
        &self,
        kind: ActionKind,
        action: impl Future<Output = Result<T, ActionError>>,
    ) -> Result<T, ActionError> {
        let pending = self.store.begin_action(kind);
        let result = action.await;
        pending.finish(result.as_ref().err());
        if let Err(error) = &result {
            self.notify_failure(error);
        }
        result
    }

    /// Request failures reach the user; validation errors are left to the caller.
    fn notify_failure(&self, error: &ActionError) {
        if error.is_validation() || !self.store.is_attached() {
            return;
        }
        self.notifier.notify(Notification::error(error.to_string()));
    }
}

pub struct LiveRosterSession {
    room_id: RoomId,
    store: Arc<RosterStore>,
    tracker: ActionTracker,
    add_product: AddProductHandler<dyn RosterBackend>,
    remove_product: RemoveProductHandler<dyn RosterBackend>,
    toggle_pin: TogglePinHandler<dyn RosterBackend>,
    refresh: Arc<RefreshRosterHandler<dyn RosterBackend>>,
    search: ProductSearch<dyn ProductCatalog>,
    sync_status: watch::Receiver<SyncStatus>,
    sync: Mutex<Option<SyncHandle>>,
    resync: Mutex<Option<JoinHandle<()>>>,
}

impl LiveRosterSession {
    pub async fn mount(
        room_id: &str,
        ports: SessionPorts,
        options: SessionOptions,
    ) -> Result<Self, ValidationError> {
        let room_id = RoomId::parse(room_id)?;
        let store = Arc::new(RosterStore::new(room_id.clone()));
        let cache = Arc::new(ProductCache::new());
        let tracker = ActionTracker {
            store: store.clone(),
            notifier: ports.notifier.clone(),
        };
        let refresh = Arc::new(RefreshRosterHandler::new(
            ports.backend.clone(),
            cache.clone(),
            store.clone(),
        ));

        let sync = RoomSyncSupervisor::new(
            room_id.clone(),
            ports.transport.clone(),
            RoomEventRouter::new(store.clone(), cache.clone()),
            options.reconnect,
            ports.notifier.clone(),
        )
        .spawn();
        let sync_status = sync.subscribe();

        match cache.warm(ports.catalog.as_ref()).await {
            Ok(count) => info!(%room_id, count, "product cache warmed"),
            Err(error) => warn!(%room_id, %error, "product cache warm-up failed"),
        }

        let session = Self {
            add_product: AddProductHandler::new(ports.backend.clone()),
            remove_product: RemoveProductHandler::new(ports.backend.clone()),
            toggle_pin: TogglePinHandler::new(ports.backend.clone()),
            search: ProductSearch::new(ports.catalog.clone(), cache, options.search_debounce),
            room_id,
            store,
            tracker,
            refresh,
            sync_status,
            sync: Mutex::new(Some(sync)),
            resync: Mutex::new(None),
        };
        // Joins finishing after this point may have missed changes the first fetch
        // did not see.
        let covered = session.sync_status.borrow().joins;
        // A failed first load is reported through the notifier and the status.
        if session.refresh().await.is_ok() {
            session.store.mark_synced(covered);
        }
        if options.resync_on_rejoin {
            *session.resync.lock().await = Some(spawn_resync(
                session.sync_updates(),
                session.refresh.clone(),
                session.tracker.clone(),
                covered,
            ));
        }
        Ok(session)
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn roster(&self) -> RosterState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<RosterView> {
        self.store.subscribe()
    }

    pub fn status(&self) -> RosterStatus {
        self.store.status()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.sync_status.borrow().state
    }

    pub fn sync_status(&self) -> SyncStatus {
        *self.sync_status.borrow()
    }

    pub fn sync_updates(&self) -> watch::Receiver<SyncStatus> {
        self.sync_status.clone()
    }

    pub fn search_results(&self) -> watch::Receiver<SearchResults> {
        self.search.subscribe()
    }

    pub async fn add_product(&self, product_id: &str) -> Result<(), ActionError> {
        let command = AddProduct {
            room_id: self.room_id.to_string(),
            product_id: product_id.to_string(),
        };
        self.tracker
            .track(ActionKind::Add, self.add_product.handle(command))
            .await
    }

    pub async fn remove_product(&self, product: impl Into<ProductRef>) -> Result<(), ActionError> {
        let command = RemoveProduct {
            room_id: self.room_id.to_string(),
            product: product.into(),
        };
        self.tracker
            .track(ActionKind::Remove, self.remove_product.handle(command))
            .await
    }

    pub async fn pin(&self, identifier: &str) -> Result<(), ActionError> {
        self.toggle(identifier, PinAction::Pin).await
    }

    pub async fn unpin(&self, identifier: &str) -> Result<(), ActionError> {
        self.toggle(identifier, PinAction::Unpin).await
    }

    async fn toggle(&self, identifier: &str, action: PinAction) -> Result<(), ActionError> {
        let command = TogglePin {
            room_id: self.room_id.to_string(),
            identifier: identifier.to_string(),
            action,
        };
        let roster = self.store.snapshot();
        self.tracker
            .track(action.kind(), self.toggle_pin.handle(&roster, command))
            .await
    }

    pub async fn refresh(&self) -> Result<usize, ActionError> {
        self.tracker
            .track(ActionKind::Refresh, self.refresh.handle())
            .await
    }

    pub async fn search(&self, query: &str) -> Result<SearchOutcome, ActionError> {
        let outcome = self.search.search(query).await;
        if let Err(error) = &outcome {
            self.tracker.notify_failure(error);
        }
        outcome
    }

    /// Idempotent. Late fetch results and push events are ignored afterwards.
    pub async fn close(&self) {
        self.store.detach();
        if let Some(resync) = self.resync.lock().await.take() {
            resync.abort();
        }
        if let Some(mut sync) = self.sync.lock().await.take() {
            sync.shutdown().await;
            info!(room_id = %self.room_id, "session closed");
        }
    }
}

/// Refetches once for every join above `covered`, including joins that landed
/// before the watcher started.
fn spawn_resync(
    mut status: watch::Receiver<SyncStatus>,
    refresh: Arc<RefreshRosterHandler<dyn RosterBackend>>,
    tracker: ActionTracker,
    mut covered: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let joins = status.borrow_and_update().joins;
            if joins > covered {
                covered = joins;
                info!(
                    room_id = %tracker.store.room_id(),
                    joins,
                    "room joined after the last fetch, resyncing roster"
                );
                if tracker.track(ActionKind::Refresh, refresh.handle()).await.is_ok() {
                    tracker.store.mark_synced(joins);
                }
            }
            if status.changed().await.is_err() {
                break;
            }
        }
    })
}
