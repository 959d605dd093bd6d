use crate::modules::live_roster::use_cases::errors::{ActionError, ActionKind};
use crate::modules::live_roster::use_cases::remove_product::command::RemoveProduct;
use crate::modules::live_roster::use_cases::remove_product::decide::decide_remove;
use crate::shared::infrastructure::backend::RosterBackend;
use std::sync::Arc;
use tracing::{info, warn};

pub struct RemoveProductHandler<TBackend>
where
    TBackend: RosterBackend + ?Sized,
{
    backend: Arc<TBackend>,
}

impl<TBackend> RemoveProductHandler<TBackend>
where
    TBackend: RosterBackend + ?Sized,
{
    pub fn new(backend: Arc<TBackend>) -> Self {
        Self { backend }
    }

    pub async fn handle(&self, command: RemoveProduct) -> Result<(), ActionError> {
        let request = decide_remove(&command)?;
        self.backend
            .remove_product(&request.room_id, &request.product_id)
            .await
            .map_err(|error| {
                warn!(
                    room_id = %request.room_id,
                    product_id = %request.product_id,
                    %error,
                    "remove failed"
                );
                ActionError::request(ActionKind::Remove, &error)
            })?;
        info!(room_id = %request.room_id, product_id = %request.product_id, "remove requested");
        Ok(())
    }
}
