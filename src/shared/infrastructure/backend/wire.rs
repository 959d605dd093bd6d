// Canonical JSON shapes of the livestream backend, and their normalization.
//
// Purpose
// - Parse the one documented envelope and entry shape into core types.
//
// Responsibilities
// - Accept a product reference as a populated object, a bare id, or {"$oid": id}.
// - Accept `addedAt` as RFC 3339 text or epoch milliseconds.
// - Render entries back into the same shape (used by the in-memory backend broadcasts).

use crate::modules::live_roster::core::entry::{
    AddedBy, IncomingEntry, PLACEHOLDER_PRODUCT_NAME, ProductRef, ProductSummary, RosterEntry,
};
use crate::shared::infrastructure::backend::BackendError;
use chrono::DateTime;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("{event} event carries no room id")]
    MissingRoom { event: String },

    #[error("{event} event carries neither an entry id nor a product id")]
    MissingIdentifier { event: String },

    #[error("{event} event carries no entry")]
    MissingEntry { event: String },
}

/// `{ success, message?, data? }`, the envelope every backend response uses.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn into_result(self) -> Result<Option<T>, BackendError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(BackendError::Rejected {
                status: None,
                message: self.message,
            })
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireProduct {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl From<WireProduct> for ProductSummary {
    fn from(product: WireProduct) -> Self {
        let name = product
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| PLACEHOLDER_PRODUCT_NAME.to_string());
        Self {
            product_id: product.id,
            name,
            image_url: product.images.into_iter().next(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireProductRef {
    Populated(WireProduct),
    ObjectId {
        #[serde(rename = "$oid")]
        oid: String,
    },
    Bare(String),
}

impl From<WireProductRef> for ProductRef {
    fn from(product: WireProductRef) -> Self {
        match product {
            WireProductRef::Populated(product) => ProductRef::Populated(product.into()),
            WireProductRef::ObjectId { oid } => ProductRef::Bare(oid),
            WireProductRef::Bare(id) => ProductRef::Bare(id),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireTimestamp {
    Millis(i64),
    Text(String),
}

impl WireTimestamp {
    pub fn to_millis(&self) -> Result<i64, DecodeError> {
        match self {
            WireTimestamp::Millis(millis) => Ok(*millis),
            WireTimestamp::Text(text) => DateTime::parse_from_rfc3339(text)
                .map(|parsed| parsed.timestamp_millis())
                .map_err(|_| DecodeError::InvalidTimestamp(text.clone())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireAddedBy {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub product: WireProductRef,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub added_at: WireTimestamp,
    #[serde(default)]
    pub added_by: Option<WireAddedBy>,
}

impl TryFrom<WireEntry> for IncomingEntry {
    type Error = DecodeError;

    fn try_from(entry: WireEntry) -> Result<Self, Self::Error> {
        Ok(IncomingEntry {
            added_at: entry.added_at.to_millis()?,
            entry_id: entry.id,
            product: entry.product.into(),
            is_pinned: entry.is_pinned,
            is_active: entry.is_active,
            added_by: entry.added_by.map(|by| AddedBy {
                name: by.name,
                username: by.username,
            }),
        })
    }
}

pub fn decode_entry(value: Value) -> Result<IncomingEntry, DecodeError> {
    let wire: WireEntry =
        serde_json::from_value(value).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    IncomingEntry::try_from(wire)
}

pub fn product_json(product: &ProductSummary) -> Value {
    json!({
        "_id": product.product_id,
        "name": product.name,
        "images": product.image_url.iter().collect::<Vec<_>>(),
    })
}

pub fn entry_json(entry: &RosterEntry) -> Value {
    let mut value = json!({
        "_id": entry.entry_id,
        "product": product_json(&entry.product),
        "isPinned": entry.is_pinned,
        "isActive": entry.is_active,
        "addedAt": entry.added_at,
    });
    if let Some(by) = &entry.added_by {
        value["addedBy"] = json!({ "name": by.name, "username": by.username });
    }
    value
}
