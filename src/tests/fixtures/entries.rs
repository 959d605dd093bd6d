// Shared test fixtures for roster entries.
// Compiled into the crate only during tests (cfg(test) in src/lib.rs).

use crate::modules::live_roster::core::entry::{
    AddedBy, IncomingEntry, ProductRef, ProductSummary, RosterEntry,
};

pub const ROOM_ID: &str = "65a1f0c2e4b0a1b2c3d4e5f6";
pub const OTHER_ROOM_ID: &str = "65a1f0c2e4b0a1b2c3d4ffff";
pub const PRODUCT_ID: &str = "64b7e2a9c1d2e3f4a5b6c7d8";
pub const LAMP_PRODUCT_ID: &str = "64b7e2a9c1d2e3f4a5b6c7d1";
pub const LAMP_ENTRY_ID: &str = "entry-lamp";
pub const T1: i64 = 1_700_000_000_000;
pub const T2: i64 = 1_700_000_060_000;
pub const T3: i64 = 1_700_000_120_000;

pub struct RosterEntryBuilder {
    inner: RosterEntry,
}

impl Default for RosterEntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl RosterEntryBuilder {
    pub fn new() -> Self {
        Self {
            inner: RosterEntry {
                entry_id: "entry-0001".to_string(),
                product: ProductSummary {
                    product_id: PRODUCT_ID.to_string(),
                    name: "Ceramic Mug".to_string(),
                    image_url: Some("https://cdn.example.com/mug.jpg".to_string()),
                },
                is_pinned: false,
                is_active: true,
                added_at: T1,
                added_by: Some(AddedBy {
                    name: Some("Host".to_string()),
                    username: Some("host".to_string()),
                }),
            },
        }
    }

    pub fn entry_id(mut self, v: impl Into<String>) -> Self {
        self.inner.entry_id = v.into();
        self
    }

    pub fn product_id(mut self, v: impl Into<String>) -> Self {
        self.inner.product.product_id = v.into();
        self
    }

    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.inner.product.name = v.into();
        self
    }

    pub fn pinned(mut self, v: bool) -> Self {
        self.inner.is_pinned = v;
        self
    }

    pub fn active(mut self, v: bool) -> Self {
        self.inner.is_active = v;
        self
    }

    pub fn added_at(mut self, v: i64) -> Self {
        self.inner.added_at = v;
        self
    }

    pub fn build(self) -> RosterEntry {
        self.inner
    }

    /// Same entry, but with the product reduced to a bare id as some push payloads send it.
    pub fn build_bare(self) -> IncomingEntry {
        let product_id = self.inner.product.product_id.clone();
        IncomingEntry {
            product: ProductRef::Bare(product_id),
            ..self.build_incoming()
        }
    }

    pub fn build_incoming(self) -> IncomingEntry {
        let entry = self.inner;
        IncomingEntry {
            entry_id: entry.entry_id,
            product: ProductRef::Populated(entry.product),
            is_pinned: entry.is_pinned,
            is_active: entry.is_active,
            added_at: entry.added_at,
            added_by: entry.added_by,
        }
    }
}

pub fn entry(entry_id: &str, added_at: i64) -> RosterEntry {
    RosterEntryBuilder::new()
        .entry_id(entry_id)
        .product_id(format!("product-{entry_id}"))
        .added_at(added_at)
        .build()
}
