// Identifier primitives shared by every use case.
//
// Purpose
// - Validate backend object ids (24 hex characters) before they reach the network.
//
// Responsibilities
// - Reject malformed ids with a field-scoped ValidationError.
// - Keep room ids and product ids as distinct types so they cannot be swapped.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const OBJECT_ID_LEN: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn parse_object_id(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    if trimmed.len() != OBJECT_ID_LEN || !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::new(
            field,
            format!("must be a {OBJECT_ID_LEN}-character hex identifier"),
        ));
    }
    Ok(trimmed.to_ascii_lowercase())
}

macro_rules! object_id {
    ($name:ident, $field:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn parse(raw: &str) -> Result<Self, ValidationError> {
                parse_object_id($field, raw).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

object_id!(RoomId, "room_id");
object_id!(ProductId, "product_id");
