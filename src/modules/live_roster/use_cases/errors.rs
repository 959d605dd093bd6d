use crate::shared::core::primitives::ValidationError;
use crate::shared::infrastructure::backend::BackendError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Refresh,
    Add,
    Remove,
    Pin,
    Unpin,
    Search,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Refresh => "refresh",
            ActionKind::Add => "add",
            ActionKind::Remove => "remove",
            ActionKind::Pin => "pin",
            ActionKind::Unpin => "unpin",
            ActionKind::Search => "search",
        }
    }

    /// Shown when the backend gives no message of its own.
    pub fn fallback_message(self) -> &'static str {
        match self {
            ActionKind::Refresh => "Failed to load livestream products",
            ActionKind::Add => "Failed to add product to livestream",
            ActionKind::Remove => "Failed to remove product from livestream",
            ActionKind::Pin => "Failed to pin product",
            ActionKind::Unpin => "Failed to unpin product",
            ActionKind::Search => "Failed to search products",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    Request { action: ActionKind, message: String },
}

impl ActionError {
    pub fn request(action: ActionKind, error: &BackendError) -> Self {
        let message = error
            .server_message()
            .unwrap_or_else(|| action.fallback_message())
            .to_string();
        ActionError::Request { action, message }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ActionError::Validation(_))
    }
}
