// Observable roster for one room.
//
// Purpose
// - Hold the reconciled roster plus action status behind a watch channel.
//
// Responsibilities
// - Route every mutation through `evolve` as one synchronous step.
// - Notify subscribers only when a mutation changed the roster.
// - Ignore mutations once detached (the owning session has closed).

use crate::modules::live_roster::core::entry::RosterEntry;
use crate::modules::live_roster::core::events::RosterEvent;
use crate::modules::live_roster::core::evolve::evolve;
use crate::modules::live_roster::core::state::RosterState;
use crate::modules::live_roster::use_cases::errors::{ActionError, ActionKind};
use crate::shared::core::primitives::RoomId;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterStatus {
    pub is_loading: bool,
    pub last_error: Option<String>,
    /// Latest room join the loaded snapshot was fetched after.
    pub synced_joins: u64,
    in_flight: BTreeMap<ActionKind, usize>,
}

impl RosterStatus {
    pub fn is_pending(&self, kind: ActionKind) -> bool {
        self.in_flight.contains_key(&kind)
    }

    pub fn pending(&self) -> Vec<ActionKind> {
        self.in_flight.keys().copied().collect()
    }

    fn release(&mut self, kind: ActionKind) {
        if let Some(count) = self.in_flight.get_mut(&kind) {
            *count -= 1;
            if *count == 0 {
                self.in_flight.remove(&kind);
            }
        }
        self.is_loading = self.is_pending(ActionKind::Refresh);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterView {
    pub roster: RosterState,
    pub status: RosterStatus,
}

pub struct RosterStore {
    room_id: RoomId,
    view: watch::Sender<RosterView>,
    attached: AtomicBool,
}

impl RosterStore {
    pub fn new(room_id: RoomId) -> Self {
        let (view, _) = watch::channel(RosterView::default());
        Self {
            room_id,
            view,
            attached: AtomicBool::new(true),
        }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Applies one event; returns true when the roster changed.
    pub fn apply(&self, event: RosterEvent) -> bool {
        if !self.is_attached() {
            debug!(
                room_id = %self.room_id,
                kind = event.kind(),
                "store detached, dropping mutation"
            );
            return false;
        }
        let kind = event.kind();
        let changed = self.view.send_if_modified(|view| {
            let next = evolve(view.roster.clone(), event);
            if next == view.roster {
                return false;
            }
            view.roster = next;
            true
        });
        debug!(room_id = %self.room_id, kind, changed, "roster event applied");
        changed
    }

    pub fn replace(&self, snapshot: Vec<RosterEntry>) -> bool {
        self.apply(RosterEvent::Replaced(snapshot))
    }

    pub fn apply_added(&self, entry: RosterEntry) -> bool {
        self.apply(RosterEvent::Added(entry))
    }

    pub fn apply_removed(&self, identifier: &str) -> bool {
        self.apply(RosterEvent::Removed(identifier.into()))
    }

    pub fn apply_pinned(&self, identifier: &str) -> bool {
        self.apply(RosterEvent::Pinned(identifier.into()))
    }

    pub fn apply_unpinned(&self, identifier: &str) -> bool {
        self.apply(RosterEvent::Unpinned(identifier.into()))
    }

    pub fn subscribe(&self) -> watch::Receiver<RosterView> {
        self.view.subscribe()
    }

    pub fn snapshot(&self) -> RosterState {
        self.view.borrow().roster.clone()
    }

    pub fn status(&self) -> RosterStatus {
        self.view.borrow().status.clone()
    }

    /// Marks `kind` in flight until the returned guard is finished or dropped.
    pub fn begin_action(self: &Arc<Self>, kind: ActionKind) -> PendingAction {
        self.view.send_modify(|view| {
            *view.status.in_flight.entry(kind).or_default() += 1;
            view.status.is_loading = view.status.is_pending(ActionKind::Refresh);
        });
        PendingAction {
            store: self.clone(),
            kind,
            settled: false,
        }
    }

    /// Request failures become `last_error`; a success clears it. Validation
    /// failures are reported inline by the caller and leave it untouched.
    fn finish_action(&self, kind: ActionKind, error: Option<&ActionError>) {
        self.view.send_modify(|view| {
            let status = &mut view.status;
            status.release(kind);
            match error {
                None => status.last_error = None,
                Some(error) if !error.is_validation() => {
                    status.last_error = Some(error.to_string())
                }
                Some(_) => {}
            }
        });
    }

    fn abandon_action(&self, kind: ActionKind) {
        debug!(
            room_id = %self.room_id,
            action = kind.as_str(),
            "action dropped before finishing"
        );
        self.view.send_modify(|view| view.status.release(kind));
    }

    pub fn mark_synced(&self, joins: u64) {
        self.view.send_if_modified(|view| {
            if joins <= view.status.synced_joins {
                return false;
            }
            view.status.synced_joins = joins;
            true
        });
    }

    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }
}

/// One in-flight action. Dropping it unfinished (a cancelled request future)
/// clears the pending mark and leaves `last_error` as it was.
pub struct PendingAction {
    store: Arc<RosterStore>,
    kind: ActionKind,
    settled: bool,
}

impl PendingAction {
    pub fn finish(mut self, error: Option<&ActionError>) {
        self.settled = true;
        self.store.finish_action(self.kind, error);
    }
}

impl Drop for PendingAction {
    fn drop(&mut self) {
        if !self.settled {
            self.store.abandon_action(self.kind);
        }
    }
}
