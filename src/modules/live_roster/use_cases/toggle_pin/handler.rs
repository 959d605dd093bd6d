use crate::modules::live_roster::core::state::RosterState;
use crate::modules::live_roster::use_cases::errors::ActionError;
use crate::modules::live_roster::use_cases::toggle_pin::command::{PinAction, TogglePin};
use crate::modules::live_roster::use_cases::toggle_pin::decide::decide_toggle;
use crate::shared::infrastructure::backend::RosterBackend;
use std::sync::Arc;
use tracing::{info, warn};

pub struct TogglePinHandler<TBackend>
where
    TBackend: RosterBackend + ?Sized,
{
    backend: Arc<TBackend>,
}

impl<TBackend> TogglePinHandler<TBackend>
where
    TBackend: RosterBackend + ?Sized,
{
    pub fn new(backend: Arc<TBackend>) -> Self {
        Self { backend }
    }

    pub async fn handle(&self, state: &RosterState, command: TogglePin) -> Result<(), ActionError> {
        let decided = decide_toggle(state, &command)?;
        let request = &decided.request;
        let result = match decided.action {
            PinAction::Pin => {
                self.backend
                    .pin_product(&request.room_id, &request.product_id)
                    .await
            }
            PinAction::Unpin => {
                self.backend
                    .unpin_product(&request.room_id, &request.product_id)
                    .await
            }
        };
        match result {
            Ok(()) => {
                info!(
                    entry_id = %decided.entry_id,
                    action = ?decided.action,
                    "pin change requested"
                );
                Ok(())
            }
            Err(error) => {
                warn!(
                    entry_id = %decided.entry_id,
                    action = ?decided.action,
                    %error,
                    "pin change failed"
                );
                Err(ActionError::request(decided.action.kind(), &error))
            }
        }
    }
}

#[cfg(test)]
mod toggle_pin_handler_tests {
    use super::*;
    use crate::modules::live_roster::core::events::RosterEvent;
    use crate::modules::live_roster::core::evolve::evolve;
    use crate::shared::infrastructure::backend::in_memory::{BackendCall, InMemoryRosterBackend};
    use crate::tests::fixtures::entries::{PRODUCT_ID, ROOM_ID, RosterEntryBuilder};
    use rstest::{fixture, rstest};

    type BeforeEachReturn = (RosterState, Arc<InMemoryRosterBackend>);

    #[fixture]
    fn before_each() -> BeforeEachReturn {
        let entry = RosterEntryBuilder::new().entry_id("e1").build();
        let state = evolve(RosterState::default(), RosterEvent::Replaced(vec![entry]));
        (state, Arc::new(InMemoryRosterBackend::new()))
    }

    fn toggle(action: PinAction) -> TogglePin {
        TogglePin {
            room_id: ROOM_ID.into(),
            identifier: "e1".into(),
            action,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_pin_by_product_id(before_each: BeforeEachReturn) {
        let (state, backend) = before_each;
        backend
            .seed_room(ROOM_ID, state.entries().to_vec())
            .await;
        let handler = TogglePinHandler::new(backend.clone());

        handler.handle(&state, toggle(PinAction::Pin)).await.unwrap();

        assert_eq!(
            backend.calls().await,
            vec![BackendCall::Pin {
                room_id: ROOM_ID.into(),
                product_id: PRODUCT_ID.into()
            }]
        );
        assert!(backend.room(ROOM_ID).await[0].is_pinned);
    }

    #[rstest]
    #[case(PinAction::Pin, "Failed to pin product")]
    #[case(PinAction::Unpin, "Failed to unpin product")]
    #[tokio::test]
    async fn it_should_use_the_action_fallback_message(
        before_each: BeforeEachReturn,
        #[case] action: PinAction,
        #[case] message: &str,
    ) {
        let (state, backend) = before_each;
        backend.toggle_offline();
        let handler = TogglePinHandler::new(backend);

        let err = handler.handle(&state, toggle(action)).await.unwrap_err();

        assert_eq!(err.to_string(), message);
    }
}
