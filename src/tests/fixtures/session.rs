// A session mounted on in-memory adapters, shared by the inbound and e2e tests.

use crate::modules::live_roster::session::{LiveRosterSession, SessionOptions, SessionPorts};
use crate::modules::live_roster::store::RosterView;
use crate::modules::live_roster::use_cases::sync_room_events::supervisor::{
    ConnectionState, SyncStatus,
};
use crate::shared::infrastructure::backend::in_memory::{BackendCall, InMemoryRosterBackend};
use crate::shared::infrastructure::notifications::in_memory::InMemoryNotifier;
use crate::shared::infrastructure::realtime::in_memory::InMemoryRealtime;
use crate::tests::fixtures::entries::{
    LAMP_ENTRY_ID, LAMP_PRODUCT_ID, ROOM_ID, RosterEntryBuilder, T1,
};
use std::sync::Arc;
use std::time::Duration;

const WAIT_LIMIT: Duration = Duration::from_secs(5);

pub struct SessionHarness {
    pub backend: Arc<InMemoryRosterBackend>,
    pub hub: InMemoryRealtime,
    pub notifier: Arc<InMemoryNotifier>,
    pub session: Arc<LiveRosterSession>,
}

#[allow(dead_code)]
impl SessionHarness {
    /// Catalog: Ceramic Mug and Desk Lamp. Room: the lamp only. Returns once the room is
    /// joined and, when resync is on, the roster was fetched after that join.
    pub async fn mount(options: SessionOptions) -> Self {
        let hub = InMemoryRealtime::new();
        let backend = Arc::new(InMemoryRosterBackend::with_broadcast(hub.clone()));
        let lamp = RosterEntryBuilder::new()
            .entry_id(LAMP_ENTRY_ID)
            .product_id(LAMP_PRODUCT_ID)
            .name("Desk Lamp")
            .added_at(T1)
            .build();
        backend
            .seed_products(vec![
                RosterEntryBuilder::new().build().product,
                lamp.product.clone(),
            ])
            .await;
        backend.seed_room(ROOM_ID, vec![lamp]).await;
        let harness = Self::mount_on(backend, hub, options).await;
        let joined = harness
            .wait_for_sync(|status| status.state == ConnectionState::Joined)
            .await;
        if options.resync_on_rejoin {
            harness
                .wait_for_roster(|view| view.status.synced_joins >= joined.joins)
                .await;
        }
        harness
    }

    pub async fn mount_on(
        backend: Arc<InMemoryRosterBackend>,
        hub: InMemoryRealtime,
        options: SessionOptions,
    ) -> Self {
        let notifier = Arc::new(InMemoryNotifier::new());
        let ports = SessionPorts {
            backend: backend.clone(),
            catalog: backend.clone(),
            transport: Arc::new(hub.clone()),
            notifier: notifier.clone(),
        };
        let session = LiveRosterSession::mount(ROOM_ID, ports, options)
            .await
            .expect("fixture room id is valid");
        Self {
            backend,
            hub,
            notifier,
            session: Arc::new(session),
        }
    }

    pub fn fast_options() -> SessionOptions {
        SessionOptions {
            search_debounce: Duration::from_millis(1),
            ..SessionOptions::default()
        }
    }

    pub async fn wait_for_sync(&self, predicate: impl Fn(&SyncStatus) -> bool) -> SyncStatus {
        let mut updates = self.session.sync_updates();
        let reached = tokio::time::timeout(WAIT_LIMIT, updates.wait_for(|s| predicate(s)))
            .await
            .expect("sync status not reached in time")
            .map(|status| *status)
            .expect("supervisor stopped");
        reached
    }

    pub async fn roster_fetches(&self) -> usize {
        self.backend
            .calls()
            .await
            .into_iter()
            .filter(|call| matches!(call, BackendCall::FetchRoster { .. }))
            .count()
    }

    pub async fn wait_for_roster(&self, predicate: impl Fn(&RosterView) -> bool) -> RosterView {
        let mut updates = self.session.subscribe();
        let reached = tokio::time::timeout(WAIT_LIMIT, updates.wait_for(|view| predicate(view)))
            .await
            .expect("roster state not reached in time")
            .map(|view| view.clone())
            .expect("store dropped");
        reached
    }
}
