// reqwest adapter for the livestream REST API.
//
// Responsibilities
// - Attach the bearer token and an `x-request-id` (UUIDv7) to every request.
// - Unwrap the `{ success, message, data }` envelope into BackendError on failure.
// - Skip roster entries that cannot be decoded instead of failing the whole snapshot.

use crate::modules::live_roster::core::entry::{IncomingEntry, ProductSummary};
use crate::shared::core::primitives::{ProductId, RoomId};
use crate::shared::infrastructure::auth::AccessTokenProvider;
use crate::shared::infrastructure::backend::wire::{Envelope, WireProduct, decode_entry};
use crate::shared::infrastructure::backend::{BackendError, ProductCatalog, RosterBackend};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct HttpRosterBackend {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl HttpRosterBackend {
    pub fn new(
        base_url: &str,
        tokens: Arc<dyn AccessTokenProvider>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| BackendError::Network(format!("invalid api url {base_url}: {e}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("live_roster/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::Network(format!("invalid endpoint {path}: {e}")))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, BackendError> {
        let request_id = Uuid::now_v7().to_string();
        let mut request = request.header(REQUEST_ID_HEADER, &request_id);
        if let Some(token) = self.tokens.access_token().await {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        debug!(%request_id, status = status.as_u16(), "backend response");

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope<Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message);
            return Err(BackendError::Rejected {
                status: Some(status.as_u16()),
                message,
            });
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))?;
        envelope.into_result().map_err(|err| match err {
            BackendError::Rejected { message, .. } => BackendError::Rejected {
                status: Some(status.as_u16()),
                message,
            },
            other => other,
        })
    }

    async fn post_product(&self, path: String, product_id: &ProductId) -> Result<(), BackendError> {
        let url = self.endpoint(&path)?;
        let request = self
            .client
            .post(url)
            .json(&json!({ "productId": product_id.as_str() }));
        self.send::<Value>(request).await.map(|_| ())
    }

    async fn post_empty(&self, path: String) -> Result<(), BackendError> {
        let url = self.endpoint(&path)?;
        self.send::<Value>(self.client.post(url)).await.map(|_| ())
    }

    async fn fetch_products(
        &self,
        request: RequestBuilder,
    ) -> Result<Vec<ProductSummary>, BackendError> {
        let products: Vec<WireProduct> = self.send(request).await?.unwrap_or_default();
        Ok(products.into_iter().map(ProductSummary::from).collect())
    }
}

#[async_trait]
impl RosterBackend for HttpRosterBackend {
    async fn fetch_roster(&self, room_id: &RoomId) -> Result<Vec<IncomingEntry>, BackendError> {
        let url = self.endpoint(&format!("livestreams/{room_id}/products"))?;
        let raw: Vec<Value> = self.send(self.client.get(url)).await?.unwrap_or_default();
        Ok(raw
            .into_iter()
            .filter_map(|value| match decode_entry(value) {
                Ok(entry) => Some(entry),
                Err(error) => {
                    warn!(%room_id, %error, "skipping undecodable roster entry");
                    None
                }
            })
            .collect())
    }

    async fn add_product(
        &self,
        room_id: &RoomId,
        product_id: &ProductId,
    ) -> Result<(), BackendError> {
        self.post_product(format!("livestreams/{room_id}/products"), product_id)
            .await
    }

    async fn remove_product(
        &self,
        room_id: &RoomId,
        product_id: &ProductId,
    ) -> Result<(), BackendError> {
        self.post_product(format!("livestreams/{room_id}/products/remove"), product_id)
            .await
    }

    async fn pin_product(
        &self,
        room_id: &RoomId,
        product_id: &ProductId,
    ) -> Result<(), BackendError> {
        self.post_empty(format!("livestreams/{room_id}/products/{product_id}/pin"))
            .await
    }

    async fn unpin_product(
        &self,
        room_id: &RoomId,
        product_id: &ProductId,
    ) -> Result<(), BackendError> {
        self.post_empty(format!("livestreams/{room_id}/products/{product_id}/unpin"))
            .await
    }
}

#[async_trait]
impl ProductCatalog for HttpRosterBackend {
    async fn search_products(&self, query: &str) -> Result<Vec<ProductSummary>, BackendError> {
        let url = self.endpoint("products")?;
        self.fetch_products(self.client.get(url).query(&[("search", query)]))
            .await
    }

    async fn list_products(&self) -> Result<Vec<ProductSummary>, BackendError> {
        let url = self.endpoint("products")?;
        self.fetch_products(self.client.get(url)).await
    }
}
