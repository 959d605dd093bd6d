use crate::modules::live_roster::use_cases::add_product::command::AddProduct;
use crate::modules::live_roster::use_cases::add_product::decide::decide_add;
use crate::modules::live_roster::use_cases::errors::{ActionError, ActionKind};
use crate::shared::infrastructure::backend::RosterBackend;
use std::sync::Arc;
use tracing::{info, warn};

/// Sends the add request. The roster itself only changes when the matching
/// `product_added` push arrives.
pub struct AddProductHandler<TBackend>
where
    TBackend: RosterBackend + ?Sized,
{
    backend: Arc<TBackend>,
}

impl<TBackend> AddProductHandler<TBackend>
where
    TBackend: RosterBackend + ?Sized,
{
    pub fn new(backend: Arc<TBackend>) -> Self {
        Self { backend }
    }

    pub async fn handle(&self, command: AddProduct) -> Result<(), ActionError> {
        let request = decide_add(&command)?;
        match self
            .backend
            .add_product(&request.room_id, &request.product_id)
            .await
        {
            Ok(()) => {
                info!(
                    room_id = %request.room_id,
                    product_id = %request.product_id,
                    "add requested"
                );
                Ok(())
            }
            Err(error) => {
                warn!(
                    room_id = %request.room_id,
                    product_id = %request.product_id,
                    %error,
                    "add failed"
                );
                Err(ActionError::request(ActionKind::Add, &error))
            }
        }
    }
}
