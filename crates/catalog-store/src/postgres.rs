//! Postgres-backed `ProductStore`.
//!
//! Query shape follows the teacher's entity-gateway refresh pipeline:
//! build a parameterized filter, run it, and fall back across a couple of
//! `try_get` conversions rather than assume the schema's exact column
//! types up front.

use crate::{CatalogError, Product, ProductStore};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

pub struct PostgresProductStore {
    pool: PgPool,
    table: String,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self::with_table(pool, "products")
    }

    pub fn with_table(pool: PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    async fn count(
        &self,
        bank: Option<&str>,
        category: Option<&str>,
        product_name: Option<&str>,
    ) -> Result<i64, CatalogError> {
        let mut query = format!("SELECT COUNT(*) AS n FROM {}", self.table);
        let mut clauses = Vec::new();
        if bank.is_some() {
            clauses.push("LOWER(bank) = LOWER($1)".to_string());
        }
        if category.is_some() {
            clauses.push(format!("LOWER(category) = LOWER(${})", clauses.len() + 1));
        }
        if product_name.is_some() {
            clauses.push(format!("LOWER(name) = LOWER(${})", clauses.len() + 1));
        }
        if !clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&clauses.join(" AND "));
        }

        tracing::debug!(query = %query, "executing product count query");

        let mut q = sqlx::query(&query);
        for value in [bank, category, product_name].into_iter().flatten() {
            q = q.bind(value);
        }

        let row = q
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;
        let count: i64 = row
            .try_get("n")
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;
        Ok(count)
    }

    async fn list(&self, bank: &str, category: &str) -> Result<Vec<Product>, CatalogError> {
        let query = format!(
            "SELECT bank, category, name, description FROM {} \
             WHERE LOWER(bank) = LOWER($1) AND LOWER(category) = LOWER($2) \
             ORDER BY name",
            self.table
        );
        let rows = sqlx::query(&query)
            .bind(bank)
            .bind(category)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        Ok(rows.into_iter().filter_map(row_to_product).collect())
    }

    async fn get(&self, bank: &str, name: &str) -> Result<Option<Product>, CatalogError> {
        let query = format!(
            "SELECT bank, category, name, description FROM {} \
             WHERE LOWER(bank) = LOWER($1) AND LOWER(name) = LOWER($2) LIMIT 1",
            self.table
        );
        let row = sqlx::query(&query)
            .bind(bank)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        Ok(row.and_then(row_to_product))
    }

    async fn distinct_banks(&self) -> Result<Vec<String>, CatalogError> {
        self.distinct_column("bank").await
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, CatalogError> {
        self.distinct_column("category").await
    }

    async fn distinct_product_names(&self) -> Result<Vec<String>, CatalogError> {
        self.distinct_column("name").await
    }
}

impl PostgresProductStore {
    async fn distinct_column(&self, column: &str) -> Result<Vec<String>, CatalogError> {
        let query = format!(
            "SELECT DISTINCT {} AS v FROM {} ORDER BY {}",
            column, self.table, column
        );
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        let mut values = Vec::with_capacity(rows.len());
        for row in rows {
            match row.try_get::<String, _>("v") {
                Ok(v) => values.push(v),
                Err(e) => {
                    tracing::warn!(error = %e, column, "failed to read distinct column value");
                }
            }
        }
        Ok(values)
    }
}

fn row_to_product(row: sqlx::postgres::PgRow) -> Option<Product> {
    let bank: String = row.try_get("bank").ok()?;
    let category: String = row.try_get("category").ok()?;
    let name: String = row.try_get("name").ok()?;
    let description: String = row
        .try_get::<String, _>("description")
        .or_else(|_| row.try_get::<Option<String>, _>("description").map(|v| v.unwrap_or_default()))
        .unwrap_or_default();
    Some(Product {
        bank,
        category,
        name,
        description,
    })
}
