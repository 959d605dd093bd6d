use crate::shared::core::primitives::{ProductId, RoomId, ValidationError};

/// A validated (room, product) pair, the input of every roster mutation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRequest {
    pub room_id: RoomId,
    pub product_id: ProductId,
}

impl ProductRequest {
    pub fn parse(room_id: &str, product_id: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            room_id: RoomId::parse(room_id)?,
            product_id: ProductId::parse(product_id)?,
        })
    }
}
