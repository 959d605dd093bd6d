use async_graphql::{Context, ErrorExtensions, Object, Result as GqlResult, SimpleObject};

use crate::modules::live_roster::core::entry::{ProductRef, RosterEntry};
use crate::modules::live_roster::use_cases::errors::ActionError;
use crate::shell::state::AppState;

#[derive(SimpleObject, Clone)]
pub struct GqlRosterEntry {
    pub entry_id: String,
    pub product_id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub is_pinned: bool,
    pub added_at: i64,
    pub added_by: Option<String>,
}

impl From<RosterEntry> for GqlRosterEntry {
    fn from(entry: RosterEntry) -> Self {
        Self {
            entry_id: entry.entry_id,
            product_id: entry.product.product_id,
            name: entry.product.name,
            image_url: entry.product.image_url,
            is_pinned: entry.is_pinned,
            added_at: entry.added_at,
            added_by: entry.added_by.and_then(|by| by.name.or(by.username)),
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct GqlRosterStatus {
    pub loaded: bool,
    pub is_loading: bool,
    pub pending: Vec<String>,
    pub last_error: Option<String>,
    pub connection: String,
    pub joins: u64,
    pub failed_attempts: u32,
}

fn gql_error(error: ActionError) -> async_graphql::Error {
    match error {
        ActionError::Validation(error) => async_graphql::Error::new(error.message.clone())
            .extend_with(|_, extensions| extensions.set("field", error.field)),
        other => async_graphql::Error::new(other.to_string()),
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn roster(&self, context: &Context<'_>) -> Vec<GqlRosterEntry> {
        let state = context.data_unchecked::<AppState>();
        state
            .session
            .roster()
            .entries()
            .iter()
            .cloned()
            .map(Into::into)
            .collect()
    }

    async fn status(&self, context: &Context<'_>) -> GqlRosterStatus {
        let state = context.data_unchecked::<AppState>();
        let status = state.session.status();
        let sync = state.session.sync_status();
        GqlRosterStatus {
            loaded: state.session.roster().is_loaded(),
            is_loading: status.is_loading,
            pending: status
                .pending()
                .into_iter()
                .map(|kind| kind.as_str().to_string())
                .collect(),
            last_error: status.last_error,
            connection: state.session.connection_state().as_str().to_string(),
            joins: sync.joins,
            failed_attempts: sync.failed_attempts,
        }
    }
}

/// Mutations resolve once the backend accepted the request; the roster itself
/// changes when the matching push event arrives.
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn add_product(&self, context: &Context<'_>, product_id: String) -> GqlResult<bool> {
        let state = context.data_unchecked::<AppState>();
        state
            .session
            .add_product(&product_id)
            .await
            .map_err(gql_error)?;
        Ok(true)
    }

    async fn remove_product(&self, context: &Context<'_>, product_id: String) -> GqlResult<bool> {
        let state = context.data_unchecked::<AppState>();
        state
            .session
            .remove_product(ProductRef::Bare(product_id))
            .await
            .map_err(gql_error)?;
        Ok(true)
    }

    /// Accepts an entry id or a product id.
    async fn pin_entry(&self, context: &Context<'_>, identifier: String) -> GqlResult<bool> {
        let state = context.data_unchecked::<AppState>();
        state.session.pin(&identifier).await.map_err(gql_error)?;
        Ok(true)
    }

    async fn unpin_entry(&self, context: &Context<'_>, identifier: String) -> GqlResult<bool> {
        let state = context.data_unchecked::<AppState>();
        state.session.unpin(&identifier).await.map_err(gql_error)?;
        Ok(true)
    }

    /// Returns the number of visible entries.
    async fn refresh_roster(&self, context: &Context<'_>) -> GqlResult<i32> {
        let state = context.data_unchecked::<AppState>();
        let visible = state.session.refresh().await.map_err(gql_error)?;
        Ok(i32::try_from(visible).unwrap_or(i32::MAX))
    }
}
