//! Signal extraction: the fixed, ordered trigger-word table that turns an
//! utterance into a set of intent-leaning flags. No machine learning, no
//! weighting — just the lexical cues the validator then checks against
//! evidence before committing to anything.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    pub count: bool,
    pub list: bool,
    pub explain: bool,
    pub explain_all: bool,
    pub compare: bool,
    pub recommend: bool,
    pub non_product_targets: Vec<String>,
    pub has_conjunction: bool,
}

impl Signals {
    pub fn any_procedural_target(&self) -> bool {
        !self.non_product_targets.is_empty()
    }
}

const COUNT_TRIGGERS: &[&str] = &["how many", "count", "number of", "total"];
const LIST_TRIGGERS: &[&str] = &["list", "show", "display", "what are", "give me all"];
const EXPLAIN_TRIGGERS: &[&str] = &["explain", "tell me about", "details of", "what is"];
const EXPLAIN_ALL_TRIGGERS: &[&str] = &["explain all", "describe all", "each of the"];
const COMPARE_TRIGGERS: &[&str] = &["compare", "vs", "versus", "difference between"];
const RECOMMEND_TRIGGERS: &[&str] = &[
    "best",
    "recommend",
    "which is better",
    "suitable for",
    "good for",
];
const NON_PRODUCT_TARGETS: &[&str] = &[
    "step",
    "steps",
    "document",
    "documents",
    "process",
    "procedure",
    "way",
    "apply",
    "application",
    "close",
    "block",
    "withdraw",
    "open",
];
const CONJUNCTIONS: &[&str] = &[" and ", ";", " + ", " also ", " plus "];

pub struct SignalExtractor;

impl SignalExtractor {
    pub fn extract(utterance: &str) -> Signals {
        let lowered = utterance.to_lowercase();
        let has_count_cue = any_contains(&lowered, COUNT_TRIGGERS);

        let non_product_targets: Vec<String> = if has_count_cue {
            NON_PRODUCT_TARGETS
                .iter()
                .filter(|target| contains_as_object_of_quantity(&lowered, target))
                .map(|s| s.to_string())
                .collect()
        } else {
            Vec::new()
        };

        Signals {
            count: has_count_cue,
            list: any_contains(&lowered, LIST_TRIGGERS),
            explain: any_contains(&lowered, EXPLAIN_TRIGGERS),
            explain_all: any_contains(&lowered, EXPLAIN_ALL_TRIGGERS),
            compare: any_contains(&lowered, COMPARE_TRIGGERS),
            recommend: any_contains(&lowered, RECOMMEND_TRIGGERS),
            non_product_targets,
            has_conjunction: any_contains(&lowered, CONJUNCTIONS),
        }
    }
}

fn any_contains(text: &str, triggers: &[&str]) -> bool {
    triggers.iter().any(|t| text.contains(t))
}

/// A non-product target "counts" only when it appears near enough to a
/// quantity cue to plausibly be its object — i.e. the utterance contains
/// both the quantity cue and the target word at all. The validator is
/// responsible for deciding what that combination means; this function's
/// job is only to notice the target word is present in a counting
/// utterance.
fn contains_as_object_of_quantity(text: &str, target: &str) -> bool {
    text.contains(target)
}
