//! Product catalog access.
//!
//! Defines the `ProductStore` trait the router depends on and ships two
//! implementations: a Postgres-backed one for production, and an in-memory
//! one for tests and for running the router with zero external services.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single catalog record as exposed to the router and its handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub bank: String,
    pub category: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog backend unavailable: {0}")]
    Unavailable(String),
    #[error("catalog query timed out")]
    Timeout,
}

/// The structured half of the router's evidence: exact counts, listings,
/// single-record lookups, and the distinct-value queries the entity
/// registry refreshes itself from.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Count products matching the given (optional) scope dimensions.
    async fn count(
        &self,
        bank: Option<&str>,
        category: Option<&str>,
        product_name: Option<&str>,
    ) -> Result<i64, CatalogError>;

    /// List every product for a fully-specified (bank, category) pair.
    async fn list(&self, bank: &str, category: &str) -> Result<Vec<Product>, CatalogError>;

    /// Look up a single product by bank and exact name.
    async fn get(&self, bank: &str, name: &str) -> Result<Option<Product>, CatalogError>;

    async fn distinct_banks(&self) -> Result<Vec<String>, CatalogError>;
    async fn distinct_categories(&self) -> Result<Vec<String>, CatalogError>;
    async fn distinct_product_names(&self) -> Result<Vec<String>, CatalogError>;
}
