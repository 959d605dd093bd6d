use crate::modules::live_roster::core::entry::{
    IncomingEntry, ProductRef, ProductSummary, RosterEntry,
};
use crate::shared::infrastructure::backend::{BackendError, ProductCatalog};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::warn;

/// Read-mostly catalog of product summaries, used to resolve entries whose push
/// payload only carries a product id.
#[derive(Debug, Default)]
pub struct ProductCache {
    products: RwLock<HashMap<String, ProductSummary>>,
}

impl ProductCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_many(&self, products: impl IntoIterator<Item = ProductSummary>) {
        let mut cache = self.products.write().await;
        for product in products {
            cache.insert(product.product_id.clone(), product);
        }
    }

    pub async fn get(&self, product_id: &str) -> Option<ProductSummary> {
        self.products.read().await.get(product_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn warm<TCatalog>(&self, catalog: &TCatalog) -> Result<usize, BackendError>
    where
        TCatalog: ProductCatalog + ?Sized,
    {
        let products = catalog.list_products().await?;
        let count = products.len();
        self.insert_many(products).await;
        Ok(count)
    }

    /// Populated products refresh the cache; bare ids are looked up and fall back to
    /// a placeholder so the entry is never dropped.
    pub async fn resolve(&self, incoming: IncomingEntry) -> RosterEntry {
        let product = match &incoming.product {
            ProductRef::Populated(summary) => {
                self.insert_many([summary.clone()]).await;
                summary.clone()
            }
            ProductRef::Bare(product_id) => match self.get(product_id).await {
                Some(summary) => summary,
                None => {
                    warn!(
                        entry_id = %incoming.entry_id,
                        product_id = %product_id,
                        "product not in catalog cache, using placeholder"
                    );
                    ProductSummary::placeholder(product_id.clone())
                }
            },
        };
        incoming.into_entry(product)
    }
}

#[cfg(test)]
mod product_cache_tests {
    use super::*;
    use crate::modules::live_roster::core::entry::PLACEHOLDER_PRODUCT_NAME;
    use crate::shared::infrastructure::backend::in_memory::InMemoryRosterBackend;
    use crate::tests::fixtures::entries::{PRODUCT_ID, RosterEntryBuilder};
    use rstest::{fixture, rstest};

    #[fixture]
    fn cache() -> ProductCache {
        ProductCache::new()
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_resolve_a_bare_id_from_the_cache(cache: ProductCache) {
        cache
            .insert_many([RosterEntryBuilder::new().build().product])
            .await;
        let entry = cache
            .resolve(RosterEntryBuilder::new().build_bare())
            .await;
        assert_eq!(entry.product.name, "Ceramic Mug");
        assert_eq!(entry.product_id(), PRODUCT_ID);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fall_back_to_a_placeholder_on_a_miss(cache: ProductCache) {
        let entry = cache
            .resolve(RosterEntryBuilder::new().build_bare())
            .await;
        assert_eq!(entry.product.name, PLACEHOLDER_PRODUCT_NAME);
        assert_eq!(entry.product_id(), PRODUCT_ID);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_learn_populated_products(cache: ProductCache) {
        cache
            .resolve(RosterEntryBuilder::new().name("Teapot").build_incoming())
            .await;
        assert_eq!(
            cache.get(PRODUCT_ID).await.map(|p| p.name),
            Some("Teapot".to_string())
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_warm_from_the_catalog(cache: ProductCache) {
        let backend = InMemoryRosterBackend::new();
        backend
            .seed_products(vec![RosterEntryBuilder::new().build().product])
            .await;
        assert_eq!(cache.warm(&backend).await, Ok(1));
        assert_eq!(cache.len().await, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_leave_the_cache_alone_when_warming_fails(cache: ProductCache) {
        let backend = InMemoryRosterBackend::new();
        backend.toggle_offline();
        assert!(cache.warm(&backend).await.is_err());
        assert_eq!(cache.len().await, 0);
    }
}
