use crate::modules::live_roster::use_cases::add_product::command::AddProduct;
use crate::modules::live_roster::use_cases::request::ProductRequest;
use crate::shared::core::primitives::ValidationError;

pub fn decide_add(command: &AddProduct) -> Result<ProductRequest, ValidationError> {
    ProductRequest::parse(&command.room_id, &command.product_id)
}
