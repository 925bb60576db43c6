//! pgvector-backed `FaqIndex`.
//!
//! The similarity query mirrors `ob-semantic-matcher`'s cosine-distance
//! pattern: `1 - (embedding <=> $1) AS similarity`, ordered by the raw
//! distance operator so the index can be used, with the similarity
//! conversion applied afterward. An `Embed` callback turns the query text
//! into a vector; this crate does not ship an embedding model.

use crate::{FaqEntry, FaqError, FaqHit, FaqIndex};
use async_trait::async_trait;
use pgvector::Vector;
use sqlx::{PgPool, Row};

/// Anything that can turn text into an embedding vector. Kept as a trait
/// object so this crate has no dependency on any particular model runtime.
#[async_trait]
pub trait Embed: Send + Sync {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}

pub struct PgVectorFaqIndex {
    pool: PgPool,
    table: String,
    embedder: Box<dyn Embed>,
}

impl PgVectorFaqIndex {
    pub fn new(pool: PgPool, embedder: Box<dyn Embed>) -> Self {
        Self::with_table(pool, embedder, "faq_entries")
    }

    pub fn with_table(pool: PgPool, embedder: Box<dyn Embed>, table: impl Into<String>) -> Self {
        Self {
            pool,
            embedder,
            table: table.into(),
        }
    }
}

#[async_trait]
impl FaqIndex for PgVectorFaqIndex {
    async fn top_k(&self, query: &str, k: usize) -> Result<Vec<FaqHit>, FaqError> {
        let embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| FaqError::Unavailable(e.to_string()))?;
        let vector = Vector::from(embedding);

        let sql = format!(
            "SELECT bank, category, question, answer, \
                    1 - (embedding <=> $1) AS similarity \
             FROM {} \
             ORDER BY embedding <=> $1 \
             LIMIT $2",
            self.table
        );

        tracing::debug!(table = %self.table, k, "executing faq top_k query");

        let rows = sqlx::query(&sql)
            .bind(vector)
            .bind(k as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| FaqError::Unavailable(e.to_string()))?;

        let mut hits = Vec::with_capacity(rows.len());
        for row in rows {
            let similarity: f64 = row
                .try_get("similarity")
                .map_err(|e| FaqError::Unavailable(e.to_string()))?;
            hits.push(FaqHit {
                similarity: similarity as f32,
                entry: FaqEntry {
                    bank: row.try_get("bank").unwrap_or_default(),
                    category: row.try_get("category").unwrap_or_default(),
                    question: row.try_get("question").unwrap_or_default(),
                    answer: row.try_get("answer").unwrap_or_default(),
                },
            });
        }
        Ok(hits)
    }
}
