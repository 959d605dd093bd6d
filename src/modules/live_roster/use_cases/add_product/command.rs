#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddProduct {
    pub room_id: String,
    pub product_id: String,
}
