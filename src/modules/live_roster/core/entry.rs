use serde::Serialize;

pub const PLACEHOLDER_PRODUCT_NAME: &str = "Unknown product";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
    pub product_id: String,
    pub name: String,
    pub image_url: Option<String>,
}

impl ProductSummary {
    pub fn placeholder(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            name: PLACEHOLDER_PRODUCT_NAME.to_string(),
            image_url: None,
        }
    }
}

/// A product reference as it arrives from the backend, after wire normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductRef {
    Populated(ProductSummary),
    Bare(String),
}

impl ProductRef {
    pub fn product_id(&self) -> &str {
        match self {
            ProductRef::Populated(summary) => &summary.product_id,
            ProductRef::Bare(id) => id,
        }
    }
}

impl From<ProductSummary> for ProductRef {
    fn from(summary: ProductSummary) -> Self {
        ProductRef::Populated(summary)
    }
}

impl From<&RosterEntry> for ProductRef {
    fn from(entry: &RosterEntry) -> Self {
        ProductRef::Populated(entry.product.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddedBy {
    pub name: Option<String>,
    pub username: Option<String>,
}

/// An entry whose product may still need resolving against the product cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingEntry {
    pub entry_id: String,
    pub product: ProductRef,
    pub is_pinned: bool,
    pub is_active: bool,
    pub added_at: i64,
    pub added_by: Option<AddedBy>,
}

impl IncomingEntry {
    pub fn into_entry(self, product: ProductSummary) -> RosterEntry {
        RosterEntry {
            entry_id: self.entry_id,
            product,
            is_pinned: self.is_pinned,
            is_active: self.is_active,
            added_at: self.added_at,
            added_by: self.added_by,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub entry_id: String,
    pub product: ProductSummary,
    pub is_pinned: bool,
    pub is_active: bool,
    pub added_at: i64,
    pub added_by: Option<AddedBy>,
}

impl RosterEntry {
    pub fn product_id(&self) -> &str {
        &self.product.product_id
    }

    /// True when `identifier` names this entry either by entry id or by product id.
    pub fn matches(&self, identifier: &str) -> bool {
        self.entry_id == identifier || self.product.product_id == identifier
    }
}
