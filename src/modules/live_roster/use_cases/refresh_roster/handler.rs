use crate::modules::live_roster::adapters::outbound::product_cache::ProductCache;
use crate::modules::live_roster::store::RosterStore;
use crate::modules::live_roster::use_cases::errors::{ActionError, ActionKind};
use crate::shared::infrastructure::backend::RosterBackend;
use std::sync::Arc;
use tracing::{info, warn};

/// Fetch-and-replace: used on mount, on manual refresh and after a rejoin.
pub struct RefreshRosterHandler<TBackend>
where
    TBackend: RosterBackend + ?Sized,
{
    backend: Arc<TBackend>,
    cache: Arc<ProductCache>,
    store: Arc<RosterStore>,
}

impl<TBackend> RefreshRosterHandler<TBackend>
where
    TBackend: RosterBackend + ?Sized,
{
    pub fn new(backend: Arc<TBackend>, cache: Arc<ProductCache>, store: Arc<RosterStore>) -> Self {
        Self {
            backend,
            cache,
            store,
        }
    }

    /// Returns the number of visible entries after the replace.
    pub async fn handle(&self) -> Result<usize, ActionError> {
        let room_id = self.store.room_id();
        let incoming = self.backend.fetch_roster(room_id).await.map_err(|error| {
            warn!(%room_id, %error, "roster fetch failed");
            ActionError::request(ActionKind::Refresh, &error)
        })?;

        let mut snapshot = Vec::with_capacity(incoming.len());
        for entry in incoming {
            snapshot.push(self.cache.resolve(entry).await);
        }
        self.store.replace(snapshot);

        let visible = self.store.snapshot().len();
        info!(%room_id, visible, "roster replaced from snapshot");
        Ok(visible)
    }
}
