//! Entity registry: the cached set of known banks, categories, and product
//! names the scope resolver matches against. Grounded on the teacher's
//! `entity-gateway::index::registry::IndexRegistry` (cached snapshot behind
//! an `RwLock`) and `entity-gateway::refresh::postgres::run_refresh_loop`
//! (background periodic refresh).

use catalog_store::{CatalogError, ProductStore};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// A snapshot of known entities, each canonical spelling mapped from its
/// lowercase form so lookups are case-insensitive without re-lowering on
/// every match attempt.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    pub banks: HashMap<String, String>,
    pub categories: HashMap<String, String>,
    pub product_names: HashMap<String, String>,
    /// Canonical product name (lowercased) -> the canonical bank that owns
    /// it, so a product name matched without a bank mention (§4.1) can
    /// inherit one.
    pub product_owner: HashMap<String, String>,
}

impl RegistrySnapshot {
    fn from_distinct(
        banks: Vec<String>,
        categories: Vec<String>,
        names: Vec<String>,
        product_owner: HashMap<String, String>,
    ) -> Self {
        let lower = |values: Vec<String>| {
            values
                .into_iter()
                .map(|v| (v.to_lowercase(), v))
                .collect::<HashMap<_, _>>()
        };
        Self {
            banks: lower(banks),
            categories: lower(categories),
            product_names: lower(names),
            product_owner,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty() && self.categories.is_empty() && self.product_names.is_empty()
    }
}

/// Process-wide cache of the entity registry, refreshed from a
/// `ProductStore` either periodically or on demand via a guarded
/// single-flight rebuild.
pub struct EntityRegistry {
    store: Arc<dyn ProductStore>,
    snapshot: RwLock<RegistrySnapshot>,
    refresh_lock: Mutex<()>,
}

impl EntityRegistry {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self {
            store,
            snapshot: RwLock::new(RegistrySnapshot::default()),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Current snapshot, without triggering a refresh.
    pub async fn snapshot(&self) -> RegistrySnapshot {
        self.snapshot.read().await.clone()
    }

    /// Rebuild the snapshot from the product store. Concurrent callers
    /// serialize on `refresh_lock` so a cache miss under load issues one
    /// set of distinct-value queries, not one per caller.
    pub async fn refresh(&self) -> Result<(), CatalogError> {
        let _guard = self.refresh_lock.lock().await;

        let banks = self.store.distinct_banks().await?;
        let categories = self.store.distinct_categories().await?;
        let names = self.store.distinct_product_names().await?;
        let product_owner = self.build_product_owner_map(&banks, &categories).await;

        let snapshot = RegistrySnapshot::from_distinct(banks, categories, names, product_owner);
        if snapshot.is_empty() {
            tracing::warn!("entity registry refresh produced an empty snapshot");
        }
        *self.snapshot.write().await = snapshot;
        Ok(())
    }

    /// The product-store interface (§6) exposes no direct name->bank
    /// query, so the owning bank is derived by walking every (bank,
    /// category) pair's listing. Entries already seen keep their first
    /// bank if a name recurs across banks.
    async fn build_product_owner_map(
        &self,
        banks: &[String],
        categories: &[String],
    ) -> HashMap<String, String> {
        let mut owner = HashMap::new();
        for bank in banks {
            for category in categories {
                match self.store.list(bank, category).await {
                    Ok(products) => {
                        for product in products {
                            owner
                                .entry(product.name.to_lowercase())
                                .or_insert(product.bank.clone());
                        }
                    }
                    Err(e) => tracing::warn!(
                        error = %e,
                        bank = %bank,
                        category = %category,
                        "failed to list products while building registry's owner map"
                    ),
                }
            }
        }
        owner
    }

    /// Refresh only if the current snapshot is empty (first use with no
    /// background loop running yet, or the last refresh failed).
    pub async fn refresh_if_empty(&self) -> Result<(), CatalogError> {
        if self.snapshot.read().await.is_empty() {
            self.refresh().await
        } else {
            Ok(())
        }
    }
}

/// Background refresh loop. Mirrors
/// `entity_gateway::refresh::postgres::run_refresh_loop`: tick on an
/// interval, log success/failure, never exit.
pub async fn run_refresh_loop(registry: Arc<EntityRegistry>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        tracing::info!("starting scheduled entity registry refresh");
        match registry.refresh().await {
            Ok(()) => tracing::info!("entity registry refresh complete"),
            Err(e) => tracing::error!(error = %e, "entity registry refresh failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_store::memory::InMemoryProductStore;
    use catalog_store::Product;

    fn store_with_sbi_and_hdfc() -> Arc<dyn ProductStore> {
        Arc::new(InMemoryProductStore::new(vec![
            Product {
                bank: "SBI".into(),
                category: "Credit Card".into(),
                name: "SBI SimplyCLICK".into(),
                description: String::new(),
            },
            Product {
                bank: "HDFC".into(),
                category: "Credit Card".into(),
                name: "HDFC Regalia".into(),
                description: String::new(),
            },
        ]))
    }

    #[tokio::test]
    async fn starts_empty_and_populates_on_refresh() {
        let registry = EntityRegistry::new(store_with_sbi_and_hdfc());
        assert!(registry.snapshot().await.is_empty());

        registry.refresh().await.unwrap();
        let snapshot = registry.snapshot().await;
        assert!(snapshot.banks.contains_key("sbi"));
        assert!(snapshot.banks.contains_key("hdfc"));
        assert_eq!(snapshot.banks.get("sbi").unwrap(), "SBI");
    }

    #[tokio::test]
    async fn refresh_populates_product_owner_map() {
        let registry = EntityRegistry::new(store_with_sbi_and_hdfc());
        registry.refresh().await.unwrap();
        let snapshot = registry.snapshot().await;
        assert_eq!(
            snapshot.product_owner.get("hdfc regalia").map(String::as_str),
            Some("HDFC")
        );
        assert_eq!(
            snapshot.product_owner.get("sbi simplyclick").map(String::as_str),
            Some("SBI")
        );
    }

    #[tokio::test]
    async fn refresh_if_empty_is_a_noop_once_populated() {
        let registry = EntityRegistry::new(store_with_sbi_and_hdfc());
        registry.refresh().await.unwrap();
        let first = registry.snapshot().await;

        registry.refresh_if_empty().await.unwrap();
        let second = registry.snapshot().await;
        assert_eq!(first.banks.len(), second.banks.len());
    }
}
