use crate::modules::live_roster::use_cases::remove_product::command::RemoveProduct;
use crate::modules::live_roster::use_cases::request::ProductRequest;
use crate::shared::core::primitives::ValidationError;

pub fn decide_remove(command: &RemoveProduct) -> Result<ProductRequest, ValidationError> {
    ProductRequest::parse(&command.room_id, command.product.product_id())
}
