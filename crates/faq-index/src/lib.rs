//! FAQ semantic index.
//!
//! Defines the `FaqIndex` trait consumed by the evidence retriever and two
//! implementations: a pgvector-backed store for production, and an
//! in-memory cosine-similarity fake for tests.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub bank: String,
    pub category: String,
    pub question: String,
    pub answer: String,
}

/// One scored hit returned by `top_k`.
///
/// `similarity` is always oriented so that higher means more relevant,
/// regardless of whether the backing store natively returns distance or
/// similarity — implementations are responsible for the conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqHit {
    pub similarity: f32,
    pub entry: FaqEntry,
}

#[derive(Debug, Error)]
pub enum FaqError {
    #[error("faq index backend unavailable: {0}")]
    Unavailable(String),
    #[error("faq index query timed out")]
    Timeout,
}

#[async_trait]
pub trait FaqIndex: Send + Sync {
    /// Return the top `k` FAQ entries most similar to `query`, highest
    /// similarity first.
    async fn top_k(&self, query: &str, k: usize) -> Result<Vec<FaqHit>, FaqError>;
}
