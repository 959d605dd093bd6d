// Debounced product search.
//
// Every keystroke takes a ticket; after the quiet period only the newest ticket
// issues a request. Every issued request takes a sequence number and its response
// is applied only while that number is still the newest issued. Superseded
// requests run to completion; their results only warm the product cache.

use crate::modules::live_roster::adapters::outbound::product_cache::ProductCache;
use crate::modules::live_roster::core::entry::ProductSummary;
use crate::modules::live_roster::use_cases::errors::{ActionError, ActionKind};
use crate::shared::infrastructure::backend::ProductCatalog;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub query: String,
    pub products: Vec<ProductSummary>,
    pub is_searching: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Cleared,
    Debounced,
    Superseded,
    Applied(Vec<ProductSummary>),
}

pub struct ProductSearch<TCatalog>
where
    TCatalog: ProductCatalog + ?Sized,
{
    catalog: Arc<TCatalog>,
    cache: Arc<ProductCache>,
    debounce: Duration,
    keystrokes: AtomicU64,
    issued: AtomicU64,
    results: watch::Sender<SearchResults>,
}

impl<TCatalog> ProductSearch<TCatalog>
where
    TCatalog: ProductCatalog + ?Sized,
{
    pub fn new(catalog: Arc<TCatalog>, cache: Arc<ProductCache>, debounce: Duration) -> Self {
        let (results, _) = watch::channel(SearchResults::default());
        Self {
            catalog,
            cache,
            debounce,
            keystrokes: AtomicU64::new(0),
            issued: AtomicU64::new(0),
            results,
        }
    }

    pub fn results(&self) -> SearchResults {
        self.results.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchResults> {
        self.results.subscribe()
    }

    pub async fn search(&self, query: &str) -> Result<SearchOutcome, ActionError> {
        let ticket = self.keystrokes.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.trim().to_string();
        if query.is_empty() {
            // Invalidate whatever is still in flight.
            self.issued.fetch_add(1, Ordering::SeqCst);
            self.results.send_replace(SearchResults::default());
            return Ok(SearchOutcome::Cleared);
        }

        tokio::time::sleep(self.debounce).await;
        if self.keystrokes.load(Ordering::SeqCst) != ticket {
            return Ok(SearchOutcome::Debounced);
        }

        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.results.send_modify(|results| results.is_searching = true);
        debug!(%query, sequence, "product search issued");
        let response = self.catalog.search_products(&query).await;

        if let Ok(products) = &response {
            self.cache.insert_many(products.iter().cloned()).await;
        }
        if self.issued.load(Ordering::SeqCst) != sequence {
            debug!(%query, sequence, "discarding superseded search response");
            return Ok(SearchOutcome::Superseded);
        }

        match response {
            Ok(products) => {
                self.results.send_replace(SearchResults {
                    query,
                    products: products.clone(),
                    is_searching: false,
                });
                Ok(SearchOutcome::Applied(products))
            }
            Err(error) => {
                warn!(%query, %error, "product search failed");
                self.results
                    .send_modify(|results| results.is_searching = false);
                Err(ActionError::request(ActionKind::Search, &error))
            }
        }
    }
}
