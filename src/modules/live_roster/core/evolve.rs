use crate::modules::live_roster::core::entry::RosterEntry;
use crate::modules::live_roster::core::events::{EntryTarget, RosterEvent};
use crate::modules::live_roster::core::state::RosterState;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Fold one event into the roster. Every branch returns a sorted state holding at
/// most one pinned entry; events that do not apply return the state unchanged.
pub fn evolve(state: RosterState, event: RosterEvent) -> RosterState {
    match event {
        RosterEvent::Replaced(snapshot) => replace(snapshot),
        RosterEvent::Added(entry) => apply_added(state, entry),
        RosterEvent::Removed(target) => apply_removed(state, &target),
        RosterEvent::Pinned(target) => apply_pinned(state, &target),
        RosterEvent::Unpinned(target) => apply_unpinned(state, &target),
    }
}

/// Pinned first, then newest first.
pub fn roster_order(a: &RosterEntry, b: &RosterEntry) -> Ordering {
    b.is_pinned
        .cmp(&a.is_pinned)
        .then_with(|| b.added_at.cmp(&a.added_at))
}

fn replace(snapshot: Vec<RosterEntry>) -> RosterState {
    let mut seen = HashSet::new();
    let mut entries: Vec<RosterEntry> = snapshot
        .into_iter()
        .filter(|entry| entry.is_active)
        .filter(|entry| seen.insert(entry.entry_id.clone()))
        .collect();
    entries.sort_by(roster_order);

    // After sorting, the first pinned entry is the newest one; it keeps the pin.
    let mut pin_taken = false;
    for entry in entries.iter_mut().filter(|entry| entry.is_pinned) {
        if pin_taken {
            entry.is_pinned = false;
        }
        pin_taken = true;
    }
    entries.sort_by(roster_order);

    RosterState {
        entries,
        loaded: true,
    }
}

fn apply_added(mut state: RosterState, entry: RosterEntry) -> RosterState {
    if !entry.is_active
        || state
            .entries
            .iter()
            .any(|existing| existing.entry_id == entry.entry_id)
    {
        return state;
    }
    if entry.is_pinned {
        state
            .entries
            .iter_mut()
            .for_each(|existing| existing.is_pinned = false);
    }
    state.entries.push(entry);
    state.entries.sort_by(roster_order);
    state
}

fn apply_removed(mut state: RosterState, target: &EntryTarget) -> RosterState {
    if let Some(index) = target.locate(&state.entries) {
        state.entries.remove(index);
    }
    state
}

fn apply_pinned(mut state: RosterState, target: &EntryTarget) -> RosterState {
    let Some(target) = target.locate(&state.entries) else {
        return state;
    };
    for (index, entry) in state.entries.iter_mut().enumerate() {
        entry.is_pinned = index == target;
    }
    state.entries.sort_by(roster_order);
    state
}

fn apply_unpinned(mut state: RosterState, target: &EntryTarget) -> RosterState {
    if let Some(index) = target.locate(&state.entries) {
        state.entries[index].is_pinned = false;
        state.entries.sort_by(roster_order);
    }
    state
}
