//! In-memory `ProductStore`, used by router-core's own tests and by anyone
//! running the router without a database.

use crate::{CatalogError, Product, ProductStore};
use async_trait::async_trait;
use std::collections::BTreeSet;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryProductStore {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductStore {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
        }
    }

    pub async fn insert(&self, product: Product) {
        self.products.write().await.push(product);
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn count(
        &self,
        bank: Option<&str>,
        category: Option<&str>,
        product_name: Option<&str>,
    ) -> Result<i64, CatalogError> {
        let products = self.products.read().await;
        let count = products
            .iter()
            .filter(|p| bank.is_none_or_eq_ci(&p.bank))
            .filter(|p| category.is_none_or_eq_ci(&p.category))
            .filter(|p| product_name.is_none_or_eq_ci(&p.name))
            .count();
        Ok(count as i64)
    }

    async fn list(&self, bank: &str, category: &str) -> Result<Vec<Product>, CatalogError> {
        let products = self.products.read().await;
        Ok(products
            .iter()
            .filter(|p| p.bank.eq_ignore_ascii_case(bank) && p.category.eq_ignore_ascii_case(category))
            .cloned()
            .collect())
    }

    async fn get(&self, bank: &str, name: &str) -> Result<Option<Product>, CatalogError> {
        let products = self.products.read().await;
        Ok(products
            .iter()
            .find(|p| p.bank.eq_ignore_ascii_case(bank) && p.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn distinct_banks(&self) -> Result<Vec<String>, CatalogError> {
        let products = self.products.read().await;
        Ok(sorted_distinct(products.iter().map(|p| p.bank.clone())))
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, CatalogError> {
        let products = self.products.read().await;
        Ok(sorted_distinct(products.iter().map(|p| p.category.clone())))
    }

    async fn distinct_product_names(&self) -> Result<Vec<String>, CatalogError> {
        let products = self.products.read().await;
        Ok(sorted_distinct(products.iter().map(|p| p.name.clone())))
    }
}

fn sorted_distinct(values: impl Iterator<Item = String>) -> Vec<String> {
    let set: BTreeSet<String> = values.collect();
    set.into_iter().collect()
}

/// Small helper trait so the filter chain above reads without repeated
/// `match`. Only used internally.
trait OptionEqCi {
    fn is_none_or_eq_ci(&self, other: &str) -> bool;
}

impl OptionEqCi for Option<&str> {
    fn is_none_or_eq_ci(&self, other: &str) -> bool {
        match self {
            None => true,
            Some(v) => v.eq_ignore_ascii_case(other),
        }
    }
}
