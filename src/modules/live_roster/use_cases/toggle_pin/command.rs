use crate::modules::live_roster::use_cases::errors::ActionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinAction {
    Pin,
    Unpin,
}

impl PinAction {
    pub fn kind(self) -> ActionKind {
        match self {
            PinAction::Pin => ActionKind::Pin,
            PinAction::Unpin => ActionKind::Unpin,
        }
    }
}

/// `identifier` names a roster entry by entry id or product id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TogglePin {
    pub room_id: String,
    pub identifier: String,
    pub action: PinAction,
}
