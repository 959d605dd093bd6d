// Ports for the request/response backend.
//
// Purpose
// - Describe what the roster needs from the livestream API without binding to HTTP.
//
// Boundaries
// - Adapters (`http`, `in_memory`) implement these traits; `wire` owns the JSON shapes.

use crate::modules::live_roster::core::entry::{IncomingEntry, ProductSummary};
use crate::shared::core::primitives::{ProductId, RoomId};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("{}", .message.as_deref().unwrap_or("backend reported a failure"))]
    Rejected {
        status: Option<u16>,
        message: Option<String>,
    },

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn server_message(&self) -> Option<&str> {
        match self {
            BackendError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

#[async_trait]
pub trait RosterBackend: Send + Sync {
    async fn fetch_roster(&self, room_id: &RoomId) -> Result<Vec<IncomingEntry>, BackendError>;

    async fn add_product(&self, room_id: &RoomId, product_id: &ProductId)
    -> Result<(), BackendError>;

    async fn remove_product(
        &self,
        room_id: &RoomId,
        product_id: &ProductId,
    ) -> Result<(), BackendError>;

    async fn pin_product(&self, room_id: &RoomId, product_id: &ProductId)
    -> Result<(), BackendError>;

    async fn unpin_product(
        &self,
        room_id: &RoomId,
        product_id: &ProductId,
    ) -> Result<(), BackendError>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn search_products(&self, query: &str) -> Result<Vec<ProductSummary>, BackendError>;

    async fn list_products(&self) -> Result<Vec<ProductSummary>, BackendError>;
}

pub mod http;
pub mod in_memory;
pub mod wire;
