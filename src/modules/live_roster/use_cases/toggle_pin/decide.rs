use crate::modules::live_roster::core::state::RosterState;
use crate::modules::live_roster::use_cases::request::ProductRequest;
use crate::modules::live_roster::use_cases::toggle_pin::command::{PinAction, TogglePin};
use crate::shared::core::primitives::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRequest {
    pub entry_id: String,
    pub action: PinAction,
    pub request: ProductRequest,
}

/// Pin requests address the product, so the entry is looked up to find its product id.
pub fn decide_toggle(
    state: &RosterState,
    command: &TogglePin,
) -> Result<PinRequest, ValidationError> {
    let identifier = command.identifier.trim();
    if identifier.is_empty() {
        return Err(ValidationError::new("entry_id", "is required"));
    }
    let entry = state
        .find(identifier)
        .ok_or_else(|| ValidationError::new("entry_id", "is not on the roster"))?;
    Ok(PinRequest {
        entry_id: entry.entry_id.clone(),
        action: command.action,
        request: ProductRequest::parse(&command.room_id, entry.product_id())?,
    })
}
