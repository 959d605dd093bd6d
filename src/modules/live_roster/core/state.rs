use crate::modules::live_roster::core::entry::RosterEntry;

/// Roster contents as seen by the view: active entries only, always sorted.
///
/// `loaded` flips to true on the first snapshot so an empty roster can be told
/// apart from one that has not been fetched yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterState {
    pub(crate) entries: Vec<RosterEntry>,
    pub(crate) loaded: bool,
}

impl RosterState {
    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pinned(&self) -> Option<&RosterEntry> {
        self.entries.iter().find(|entry| entry.is_pinned)
    }

    pub fn find(&self, identifier: &str) -> Option<&RosterEntry> {
        self.entries.iter().find(|entry| entry.matches(identifier))
    }

    pub fn entry_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.entry_id.as_str())
            .collect()
    }
}
