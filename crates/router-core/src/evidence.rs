//! Evidence retrieval: the concurrent product-store count and FAQ top-k
//! lookups the validator checks signals against. Staged-async shape follows
//! the teacher's `ob_agentic::lexicon::pipeline::LexiconPipeline::process`.

use catalog_store::ProductStore;
use faq_index::{FaqHit, FaqIndex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::scope::Scope;

/// Backoff before the single retry on a transient backend failure, per the
/// error-handling design (§7: `TransientBackendUnavailable`).
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// `-1` means "unknown" — either the scope was too weak to count under, or
/// the backend timed out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub db_count: i64,
    pub faq_top_similarity: f32,
    pub faq_top_hit: Option<FaqHit>,
}

impl Evidence {
    pub fn unknown() -> Self {
        Self {
            db_count: -1,
            faq_top_similarity: 0.0,
            faq_top_hit: None,
        }
    }
}

pub struct EvidenceRetriever {
    store: Arc<dyn ProductStore>,
    faq: Arc<dyn FaqIndex>,
    deadline: Duration,
}

impl EvidenceRetriever {
    pub fn new(store: Arc<dyn ProductStore>, faq: Arc<dyn FaqIndex>, deadline: Duration) -> Self {
        Self {
            store,
            faq,
            deadline,
        }
    }

    /// Issue the count and top-k queries concurrently, each under its own
    /// deadline. A timed-out or failed call degrades to its "unknown"
    /// sentinel rather than aborting the whole retrieval.
    pub async fn retrieve(&self, scope: &Scope, utterance: &str) -> Evidence {
        // Counting only makes sense once the scope resolves at least one
        // dimension; with nothing resolved the store would return the
        // grand total, which the validator must never treat as a per-scope
        // count.
        let count_fut = async {
            if scope.strength() == 0.0 {
                return -1;
            }
            for attempt in 0..2 {
                match tokio::time::timeout(
                    self.deadline,
                    self.store.count(
                        scope.bank.as_deref(),
                        scope.category.as_deref(),
                        scope.product_name.as_deref(),
                    ),
                )
                .await
                {
                    Ok(Ok(count)) => return count,
                    Ok(Err(e)) => tracing::warn!(error = %e, attempt, "product store count failed"),
                    Err(_) => tracing::warn!(attempt, "product store count timed out"),
                }
                if attempt == 0 {
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
            }
            tracing::warn!("product store count unavailable after retry, using unknown sentinel");
            -1
        };

        let faq_fut = async {
            for attempt in 0..2 {
                match tokio::time::timeout(self.deadline, self.faq.top_k(utterance, 1)).await {
                    Ok(Ok(hits)) => return hits.into_iter().next(),
                    Ok(Err(e)) => tracing::warn!(error = %e, attempt, "faq index query failed"),
                    Err(_) => tracing::warn!(attempt, "faq index query timed out"),
                }
                if attempt == 0 {
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
            }
            tracing::warn!("faq index unavailable after retry, using unknown sentinel");
            None
        };

        let (db_count, faq_top_hit) = tokio::join!(count_fut, faq_fut);
        let faq_top_similarity = faq_top_hit.as_ref().map(|h| h.similarity).unwrap_or(0.0);

        Evidence {
            db_count,
            faq_top_similarity,
            faq_top_hit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_store::memory::InMemoryProductStore;
    use catalog_store::Product;
    use faq_index::memory::InMemoryFaqIndex;
    use faq_index::FaqEntry;

    fn retriever() -> EvidenceRetriever {
        let store = Arc::new(InMemoryProductStore::new(vec![Product {
            bank: "SBI".into(),
            category: "Credit Card".into(),
            name: "SBI SimplyCLICK".into(),
            description: String::new(),
        }]));
        let faq = Arc::new(InMemoryFaqIndex::new(vec![FaqEntry {
            bank: "SBI".into(),
            category: "Loan".into(),
            question: "how many steps to apply for a home loan".into(),
            answer: "5 steps.".into(),
        }]));
        EvidenceRetriever::new(store, faq, Duration::from_millis(100))
    }

    #[tokio::test]
    async fn counts_under_full_scope() {
        let scope = Scope {
            bank: Some("SBI".into()),
            category: Some("Credit Card".into()),
            ..Default::default()
        };
        let evidence = retriever().retrieve(&scope, "how many SBI credit cards").await;
        assert_eq!(evidence.db_count, 1);
    }

    #[tokio::test]
    async fn unresolved_scope_yields_unknown_count() {
        let evidence = retriever().retrieve(&Scope::default(), "how many steps to apply").await;
        assert_eq!(evidence.db_count, -1);
        assert!(evidence.faq_top_similarity > 0.0);
    }

    /// Fails its first `count` call, then succeeds — exercises the
    /// single-retry-with-backoff path from the error-handling design (§7).
    struct FlakyOnceStore {
        attempts: std::sync::atomic::AtomicU32,
    }

    #[async_trait::async_trait]
    impl catalog_store::ProductStore for FlakyOnceStore {
        async fn count(
            &self,
            _bank: Option<&str>,
            _category: Option<&str>,
            _product_name: Option<&str>,
        ) -> Result<i64, catalog_store::CatalogError> {
            let attempt = self.attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if attempt == 0 {
                Err(catalog_store::CatalogError::Unavailable("connection reset".into()))
            } else {
                Ok(7)
            }
        }
        async fn list(&self, _bank: &str, _category: &str) -> Result<Vec<catalog_store::Product>, catalog_store::CatalogError> {
            Ok(vec![])
        }
        async fn get(&self, _bank: &str, _name: &str) -> Result<Option<catalog_store::Product>, catalog_store::CatalogError> {
            Ok(None)
        }
        async fn distinct_banks(&self) -> Result<Vec<String>, catalog_store::CatalogError> {
            Ok(vec![])
        }
        async fn distinct_categories(&self) -> Result<Vec<String>, catalog_store::CatalogError> {
            Ok(vec![])
        }
        async fn distinct_product_names(&self) -> Result<Vec<String>, catalog_store::CatalogError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn transient_count_failure_recovers_on_retry() {
        let store = Arc::new(FlakyOnceStore {
            attempts: std::sync::atomic::AtomicU32::new(0),
        });
        let faq = Arc::new(InMemoryFaqIndex::new(vec![]));
        let retriever = EvidenceRetriever::new(store, faq, Duration::from_millis(100));
        let scope = Scope {
            bank: Some("SBI".into()),
            category: Some("Credit Card".into()),
            ..Default::default()
        };
        let evidence = retriever.retrieve(&scope, "how many SBI credit cards").await;
        assert_eq!(evidence.db_count, 7);
    }
}
