use crate::modules::live_roster::core::entry::{IncomingEntry, RosterEntry};

/// Mutations understood by the roster reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterEvent {
    Replaced(Vec<RosterEntry>),
    Added(RosterEntry),
    Removed(EntryTarget),
    Pinned(EntryTarget),
    Unpinned(EntryTarget),
}

impl RosterEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            RosterEvent::Replaced(_) => "replaced",
            RosterEvent::Added(_) => "added",
            RosterEvent::Removed(_) => "removed",
            RosterEvent::Pinned(_) => "pinned",
            RosterEvent::Unpinned(_) => "unpinned",
        }
    }
}

/// The entry a removal or pin change refers to.
///
/// Pushes may carry an entry id, a product id, or both. The entry id is tried
/// first; the product id is the fallback when no entry carries that entry id.
/// A bare identifier converted with `From` is tried as both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryTarget {
    pub entry_id: Option<String>,
    pub product_id: Option<String>,
}

impl EntryTarget {
    /// Blank ids are dropped; `None` when nothing is left to match on.
    pub fn new(entry_id: Option<String>, product_id: Option<String>) -> Option<Self> {
        let present = |id: Option<String>| id.filter(|id| !id.trim().is_empty());
        let target = Self {
            entry_id: present(entry_id),
            product_id: present(product_id),
        };
        (target.entry_id.is_some() || target.product_id.is_some()).then_some(target)
    }

    pub fn locate(&self, entries: &[RosterEntry]) -> Option<usize> {
        let by_entry = self
            .entry_id
            .as_deref()
            .and_then(|id| entries.iter().position(|entry| entry.entry_id == id));
        by_entry.or_else(|| {
            let id = self.product_id.as_deref()?;
            entries
                .iter()
                .position(|entry| entry.product.product_id == id)
        })
    }
}

impl From<&str> for EntryTarget {
    fn from(identifier: &str) -> Self {
        Self {
            entry_id: Some(identifier.to_string()),
            product_id: Some(identifier.to_string()),
        }
    }
}

impl From<String> for EntryTarget {
    fn from(identifier: String) -> Self {
        Self::from(identifier.as_str())
    }
}

/// A decoded realtime push, scoped to the room it was published in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomEvent {
    pub room_id: String,
    pub push: PushEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    ProductAdded(IncomingEntry),
    ProductRemoved(EntryTarget),
    ProductPinned(EntryTarget),
    ProductUnpinned(EntryTarget),
}

#[cfg(test)]
mod entry_target_tests {
    use super::*;
    use crate::tests::fixtures::entries::{RosterEntryBuilder, T1, T2, entry};
    use rstest::rstest;

    fn entries() -> Vec<RosterEntry> {
        vec![
            entry("e1", T1),
            RosterEntryBuilder::new()
                .entry_id("e2")
                .product_id("product-shared")
                .added_at(T2)
                .build(),
        ]
    }

    #[rstest]
    #[case(Some("e1"), Some("product-shared"), Some(0))]
    #[case(Some("stale"), Some("product-shared"), Some(1))]
    #[case(None, Some("product-e1"), Some(0))]
    #[case(Some("stale"), None, None)]
    fn it_should_fall_back_to_the_product_id(
        #[case] entry_id: Option<&str>,
        #[case] product_id: Option<&str>,
        #[case] expected: Option<usize>,
    ) {
        let target = EntryTarget::new(entry_id.map(String::from), product_id.map(String::from))
            .unwrap();
        assert_eq!(target.locate(&entries()), expected);
    }

    #[rstest]
    fn it_should_need_at_least_one_identifier() {
        assert_eq!(EntryTarget::new(Some(" ".into()), None), None);
        assert_eq!(
            EntryTarget::new(Some("".into()), Some("p1".into())),
            Some(EntryTarget {
                entry_id: None,
                product_id: Some("p1".into()),
            })
        );
    }
}
