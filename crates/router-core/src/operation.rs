//! The operation sum type the validator produces and the router returns.
//! Tagged-enum shape follows the teacher's `#[serde(tag = "type", rename_all
//! = "snake_case")]` convention used throughout `rust/src/api/session.rs`.

use crate::evidence::Evidence;
use crate::scope::Scope;
use crate::signals::Signals;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Count {
        scope: Scope,
        evidence: Evidence,
        suppress_greeting: bool,
    },
    List {
        scope: Scope,
        suppress_greeting: bool,
    },
    Explain {
        scope: Scope,
        suppress_greeting: bool,
    },
    ExplainAll {
        scope: Scope,
        suppress_greeting: bool,
    },
    Compare {
        scope: Scope,
        banks: Vec<String>,
        suppress_greeting: bool,
    },
    Recommend {
        scope: Scope,
        suppress_greeting: bool,
    },
    Faq {
        query: String,
        evidence: Evidence,
        suppress_greeting: bool,
    },
    Clarify {
        prompt: String,
    },
    /// A canned reply to a bare greeting (§4.5 step 1) — never reaches the
    /// LLM or the validator.
    Greeting {
        message: String,
    },
    LlmFallback {
        utterance: String,
    },
}

impl Operation {
    pub fn tag(&self) -> &'static str {
        match self {
            Operation::Count { .. } => "COUNT",
            Operation::List { .. } => "LIST",
            Operation::Explain { .. } => "EXPLAIN",
            Operation::ExplainAll { .. } => "EXPLAIN_ALL",
            Operation::Compare { .. } => "COMPARE",
            Operation::Recommend { .. } => "RECOMMEND",
            Operation::Faq { .. } => "FAQ",
            Operation::Clarify { .. } => "CLARIFY",
            Operation::Greeting { .. } => "GREETING",
            Operation::LlmFallback { .. } => "LLM_FALLBACK",
        }
    }

    pub fn is_clarify(&self) -> bool {
        matches!(self, Operation::Clarify { .. })
    }

    pub fn with_suppressed_greeting(mut self) -> Self {
        match &mut self {
            Operation::Count { suppress_greeting, .. }
            | Operation::List { suppress_greeting, .. }
            | Operation::Explain { suppress_greeting, .. }
            | Operation::ExplainAll { suppress_greeting, .. }
            | Operation::Compare { suppress_greeting, .. }
            | Operation::Recommend { suppress_greeting, .. }
            | Operation::Faq { suppress_greeting, .. } => *suppress_greeting = true,
            Operation::Clarify { .. } | Operation::Greeting { .. } | Operation::LlmFallback { .. } => {}
        }
        self
    }
}

/// The observability snapshot carried alongside a decision: the raw
/// signals and evidence the validator reasoned over, plus the rewritten
/// utterance if the follow-up resolver fired. Per SPEC_FULL.md §6, this
/// rides along on every decision so callers can log the full
/// `{signals, evidence, decision}` triple without re-deriving it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDebug {
    pub signals: Signals,
    pub evidence: Evidence,
    pub rewritten: Option<String>,
}

/// The router's output for a single utterance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub operations: Vec<Operation>,
    pub rewritten_utterance: Option<String>,
    /// Absent for paths that never reach signal/evidence derivation
    /// (greeting short-circuit, request-deadline timeout, empty registry).
    pub debug: Option<RoutingDebug>,
}

impl RoutingDecision {
    pub fn single(operation: Operation) -> Self {
        Self {
            operations: vec![operation],
            rewritten_utterance: None,
            debug: None,
        }
    }

    pub fn clarify(prompt: impl Into<String>) -> Self {
        Self::single(Operation::Clarify {
            prompt: prompt.into(),
        })
    }

    pub fn with_debug(mut self, debug: RoutingDebug) -> Self {
        self.debug = Some(debug);
        self
    }

    /// The CLARIFY prompt text, if this decision terminated in one.
    pub fn clarify_prompt(&self) -> Option<&str> {
        match self.operations.first() {
            Some(Operation::Clarify { prompt }) if self.is_clarify() => Some(prompt.as_str()),
            _ => None,
        }
    }

    pub fn is_clarify(&self) -> bool {
        self.operations.len() == 1 && self.operations[0].is_clarify()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clarify_decision_carries_exactly_one_operation() {
        let decision = RoutingDecision::clarify("Which bank?");
        assert!(decision.is_clarify());
        assert_eq!(decision.operations.len(), 1);
    }

    #[test]
    fn tag_matches_expected_name() {
        let op = Operation::Count {
            scope: Scope::default(),
            evidence: Evidence::unknown(),
            suppress_greeting: false,
        };
        assert_eq!(op.tag(), "COUNT");
    }

    #[test]
    fn suppressing_greeting_is_a_noop_for_clarify() {
        let op = Operation::Clarify {
            prompt: "x".into(),
        }
        .with_suppressed_greeting();
        assert!(op.is_clarify());
    }

    #[test]
    fn clarify_prompt_is_exposed_only_for_clarify_decisions() {
        let clarify = RoutingDecision::clarify("Which bank?");
        assert_eq!(clarify.clarify_prompt(), Some("Which bank?"));

        let non_clarify = RoutingDecision::single(Operation::LlmFallback {
            utterance: "what time is it".into(),
        });
        assert_eq!(non_clarify.clarify_prompt(), None);
    }

    #[test]
    fn with_debug_attaches_the_signal_evidence_snapshot() {
        let decision = RoutingDecision::single(Operation::Count {
            scope: Scope::default(),
            evidence: Evidence::unknown(),
            suppress_greeting: false,
        })
        .with_debug(RoutingDebug {
            signals: Signals::default(),
            evidence: Evidence::unknown(),
            rewritten: None,
        });
        assert!(decision.debug.is_some());
    }
}
