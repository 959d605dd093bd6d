use crate::modules::live_roster::core::entry::ProductRef;

/// `product` may be populated or a bare id; only its id is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveProduct {
    pub room_id: String,
    pub product: ProductRef,
}
