//! In-memory `FaqIndex`.
//!
//! No embedding model is shipped with this crate, so similarity is computed
//! with token-set overlap (Jaccard) over lowercased question text. This is
//! intentionally crude — it exists so `router-core` can be tested and run
//! without a vector database, not to rival the pgvector-backed index.

use crate::{FaqEntry, FaqError, FaqHit, FaqIndex};
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryFaqIndex {
    entries: RwLock<Vec<FaqEntry>>,
}

impl InMemoryFaqIndex {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub async fn insert(&self, entry: FaqEntry) {
        self.entries.write().await.push(entry);
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f32 / union as f32
}

#[async_trait]
impl FaqIndex for InMemoryFaqIndex {
    async fn top_k(&self, query: &str, k: usize) -> Result<Vec<FaqHit>, FaqError> {
        let query_tokens = tokenize(query);
        let entries = self.entries.read().await;

        let mut hits: Vec<FaqHit> = entries
            .iter()
            .map(|entry| FaqHit {
                similarity: jaccard(&query_tokens, &tokenize(&entry.question)),
                entry: entry.clone(),
            })
            .collect();

        hits.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap());
        hits.truncate(k);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> InMemoryFaqIndex {
        InMemoryFaqIndex::new(vec![
            FaqEntry {
                bank: "SBI".into(),
                category: "Loan".into(),
                question: "how many steps to apply for a home loan".into(),
                answer: "There are 5 steps: eligibility check, document upload, verification, sanction, disbursal.".into(),
            },
            FaqEntry {
                bank: "HDFC".into(),
                category: "Credit Card".into(),
                question: "how do I block a lost credit card".into(),
                answer: "Call the 24x7 helpline or use the mobile app's block-card action.".into(),
            },
        ])
    }

    #[tokio::test]
    async fn ranks_the_most_overlapping_question_first() {
        let index = sample_index();
        let hits = index.top_k("how many steps to apply for a loan", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entry.bank, "SBI");
        assert!(hits[0].similarity > 0.3);
    }

    #[tokio::test]
    async fn unrelated_query_scores_low() {
        let index = sample_index();
        let hits = index.top_k("what is the weather today", 1).await.unwrap();
        assert!(hits[0].similarity < 0.2);
    }

    #[tokio::test]
    async fn empty_index_returns_empty() {
        let index = InMemoryFaqIndex::new(vec![]);
        let hits = index.top_k("anything", 3).await.unwrap();
        assert!(hits.is_empty());
    }
}
