use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::modules::live_roster::core::entry::{ProductRef, ProductSummary, RosterEntry};
use crate::modules::live_roster::use_cases::errors::{ActionError, ActionKind};
use crate::modules::live_roster::use_cases::search_products::handler::SearchOutcome;
use crate::modules::live_roster::use_cases::sync_room_events::supervisor::ConnectionState;
use crate::shared::infrastructure::backend::wire::WireProductRef;
use crate::shell::state::AppState;

#[derive(Serialize)]
pub struct StatusResponse {
    pub is_loading: bool,
    pub pending: Vec<ActionKind>,
    pub last_error: Option<String>,
    pub connection: ConnectionState,
    pub joins: u64,
    pub failed_attempts: u32,
    pub synced_joins: u64,
}

#[derive(Serialize)]
pub struct RosterResponse {
    pub room_id: String,
    pub loaded: bool,
    pub entries: Vec<RosterEntry>,
    pub status: StatusResponse,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProductBody {
    pub product_id: String,
}

/// `product` accepts a populated product, a bare id or `{"$oid": id}`.
#[derive(Deserialize)]
pub struct RemoveProductBody {
    pub product: WireProductRef,
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub outcome: &'static str,
    pub products: Vec<ProductSummary>,
}

fn status_response(state: &AppState) -> StatusResponse {
    let status = state.session.status();
    let sync = state.session.sync_status();
    StatusResponse {
        is_loading: status.is_loading,
        pending: status.pending(),
        last_error: status.last_error,
        connection: state.session.connection_state(),
        joins: sync.joins,
        failed_attempts: sync.failed_attempts,
        synced_joins: status.synced_joins,
    }
}

fn error_response(error: ActionError) -> Response {
    match error {
        ActionError::Validation(error) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "field": error.field, "message": error.message })),
        )
            .into_response(),
        ActionError::Request { action, message } => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "action": action, "message": message })),
        )
            .into_response(),
    }
}

fn accepted(result: Result<(), ActionError>) -> Response {
    match result {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(error) => error_response(error),
    }
}

pub async fn roster(State(state): State<AppState>) -> impl IntoResponse {
    let roster = state.session.roster();
    Json(RosterResponse {
        room_id: state.session.room_id().to_string(),
        loaded: roster.is_loaded(),
        entries: roster.entries().to_vec(),
        status: status_response(&state),
    })
}

pub async fn refresh(State(state): State<AppState>) -> Response {
    match state.session.refresh().await {
        Ok(visible) => Json(json!({ "visible": visible })).into_response(),
        Err(error) => error_response(error),
    }
}

pub async fn add_product(
    State(state): State<AppState>,
    body: Result<Json<AddProductBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    };
    accepted(state.session.add_product(&body.product_id).await)
}

pub async fn remove_product(
    State(state): State<AppState>,
    body: Result<Json<RemoveProductBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    };
    accepted(
        state
            .session
            .remove_product(ProductRef::from(body.product))
            .await,
    )
}

pub async fn pin(State(state): State<AppState>, Path(entry_id): Path<String>) -> Response {
    accepted(state.session.pin(&entry_id).await)
}

pub async fn unpin(State(state): State<AppState>, Path(entry_id): Path<String>) -> Response {
    accepted(state.session.unpin(&entry_id).await)
}

pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let (outcome, products) = match state.session.search(&params.q).await {
        Ok(SearchOutcome::Applied(products)) => ("applied", products),
        Ok(SearchOutcome::Cleared) => ("cleared", Vec::new()),
        Ok(SearchOutcome::Debounced) => ("debounced", Vec::new()),
        Ok(SearchOutcome::Superseded) => ("superseded", Vec::new()),
        Err(error) => return error_response(error),
    };
    Json(SearchResponse { outcome, products }).into_response()
}
