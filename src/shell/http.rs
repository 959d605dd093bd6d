use axum::{
    Extension, Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::modules::live_roster::adapters::inbound::http as roster_http;
use crate::shell::graphql::{build_schema, graphiql, graphql};
use crate::shell::state::AppState;

pub fn router(state: AppState) -> Router {
    let schema = build_schema(state.clone());
    Router::new()
        .route("/roster", get(roster_http::roster))
        .route("/roster/refresh", post(roster_http::refresh))
        .route("/roster/products", post(roster_http::add_product))
        .route("/roster/products/remove", post(roster_http::remove_product))
        .route("/roster/entries/{entry_id}/pin", post(roster_http::pin))
        .route("/roster/entries/{entry_id}/unpin", post(roster_http::unpin))
        .route("/products/search", get(roster_http::search))
        .route("/gql", get(graphiql).post(graphql))
        .layer(Extension(schema))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
