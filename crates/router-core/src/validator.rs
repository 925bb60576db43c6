//! The operation validator: the heart of the router. Combines scope,
//! signals, and evidence into an ordered operation list via a top-to-bottom
//! decision procedure with early return. Struct/method shape follows the
//! teacher's `ob_agentic::validator::AgentValidator`.

use crate::evidence::Evidence;
use crate::operation::Operation;
use crate::registry::RegistrySnapshot;
use crate::scope::Scope;
use crate::signals::Signals;

const CONJUNCTIONS: &[&str] = &[" and ", ";", " + ", " also ", " plus "];

pub struct OperationValidator;

impl OperationValidator {
    /// `context_bank` is the bank inherited from conversation state, used
    /// only by the implicit-list smart fork (rule 5) — never by
    /// COMPARE/RECOMMEND, which require an explicit bank in the utterance.
    pub fn validate(
        utterance: &str,
        scope: &Scope,
        signals: &Signals,
        evidence: &Evidence,
        context_bank: Option<&str>,
        faq_similarity_threshold: f32,
        registry: &RegistrySnapshot,
    ) -> Vec<Operation> {
        // Rule 1: non-product target override.
        if signals.any_procedural_target() {
            let faq_op = Operation::Faq {
                query: utterance.to_string(),
                evidence: evidence.clone(),
                suppress_greeting: false,
            };

            if signals.has_conjunction && signals.count && scope.strength() >= 0.5 {
                if let Some((count_clause, faq_clause)) = split_on_conjunction(utterance) {
                    let count_op = Operation::Count {
                        scope: scope.clone(),
                        evidence: evidence.clone(),
                        suppress_greeting: false,
                    };
                    let faq_op = Operation::Faq {
                        query: faq_clause,
                        evidence: evidence.clone(),
                        suppress_greeting: true,
                    };
                    let _ = count_clause;
                    return vec![count_op, faq_op];
                }
            }

            return vec![faq_op];
        }

        // Rule 1b: AmbiguousScope — two or more banks named but no
        // compare/recommend signal to explain why. Ask which one is meant
        // rather than silently picking the textually-first bank.
        if !scope.alt_banks.is_empty() && !signals.compare && !signals.recommend {
            let mut banks = vec![scope.bank.clone().unwrap_or_default()];
            banks.extend(scope.alt_banks.clone());
            return vec![Operation::Clarify {
                prompt: format!(
                    "Did you mean {}? Please name one bank, or ask me to compare them.",
                    banks.join(" or ")
                ),
            }];
        }

        // Rule 2: compare/recommend take priority over count when a
        // category and at least one bank resolve.
        if (signals.compare || signals.recommend) && scope.category.is_some() && scope.bank.is_some() {
            if signals.compare {
                if scope.alt_banks.is_empty() {
                    // Exactly one bank named with a compare signal:
                    // proceed as EXPLAIN_ALL filtered to that bank rather
                    // than asking for a second one. See DESIGN.md, Open
                    // Question 3.
                    return vec![Operation::ExplainAll {
                        scope: scope.clone(),
                        suppress_greeting: false,
                    }];
                }
                let mut banks = vec![scope.bank.clone().unwrap()];
                banks.extend(scope.alt_banks.clone());
                return vec![Operation::Compare {
                    scope: scope.clone(),
                    banks,
                    suppress_greeting: false,
                }];
            }
            return vec![Operation::Recommend {
                scope: scope.clone(),
                suppress_greeting: false,
            }];
        }

        // Rule 3: explicit COUNT.
        if signals.count && evidence.db_count >= 1 && scope.strength() >= 0.5 {
            return vec![Operation::Count {
                scope: scope.clone(),
                evidence: evidence.clone(),
                suppress_greeting: false,
            }];
        }

        // Rule 4: explicit LIST.
        if signals.list {
            if evidence.db_count >= 1 {
                return vec![Operation::List {
                    scope: scope.clone(),
                    suppress_greeting: false,
                }];
            }
            if scope.strength() < 0.5 {
                return vec![Operation::Clarify {
                    prompt: clarify_prompt_for_missing_dimension(scope, registry),
                }];
            }
        }

        // Rule 5: implicit LIST ("smart fork") — bare category plus an
        // inherited bank from conversation context.
        if !signals.list && scope.category.is_some() && scope.bank.is_none() {
            if let Some(bank) = context_bank {
                let mut forked_scope = scope.clone();
                forked_scope.bank = Some(bank.to_string());
                return vec![Operation::List {
                    scope: forked_scope,
                    suppress_greeting: false,
                }];
            }
            return vec![Operation::Clarify {
                prompt: clarify_prompt_for_missing_dimension(scope, registry),
            }];
        }

        // Rule 6: EXPLAIN / EXPLAIN_ALL.
        if signals.explain_all && scope.category.is_some() {
            return vec![Operation::ExplainAll {
                scope: scope.clone(),
                suppress_greeting: false,
            }];
        }
        if signals.explain && scope.product_name.is_some() {
            return vec![Operation::Explain {
                scope: scope.clone(),
                suppress_greeting: false,
            }];
        }

        // Rule 7: FAQ by evidence alone.
        if evidence.faq_top_similarity >= faq_similarity_threshold {
            return vec![Operation::Faq {
                query: utterance.to_string(),
                evidence: evidence.clone(),
                suppress_greeting: false,
            }];
        }

        // Rule 8: bare bank or bare category with no other signal.
        if scope.strength() == 0.5 && no_signal(signals) {
            return vec![Operation::Clarify {
                prompt: clarify_prompt_for_missing_dimension(scope, registry),
            }];
        }

        // Rule 9: nothing else fit.
        vec![Operation::LlmFallback {
            utterance: utterance.to_string(),
        }]
    }
}

fn no_signal(signals: &Signals) -> bool {
    !(signals.count
        || signals.list
        || signals.explain
        || signals.explain_all
        || signals.compare
        || signals.recommend)
}

/// §4.7: a missing bank gets named candidates, not just a bare question.
/// Up to 5 registry entries, sorted so the prompt is stable across calls
/// against the same snapshot rather than wandering with HashMap order.
fn clarify_prompt_for_missing_dimension(scope: &Scope, registry: &RegistrySnapshot) -> String {
    match (&scope.bank, &scope.category) {
        (None, _) => format!("Which bank? Known banks: {}.", top_known_banks(registry)),
        (Some(_), None) => "Which product type? (credit card, debit card, loan, scheme)".to_string(),
        _ => "Could you be more specific — a bank, a product category, or a specific question?".to_string(),
    }
}

fn top_known_banks(registry: &RegistrySnapshot) -> String {
    let mut banks: Vec<&str> = registry.banks.values().map(String::as_str).collect();
    banks.sort_unstable();
    banks.truncate(5);
    if banks.is_empty() {
        "none loaded yet".to_string()
    } else {
        banks.join(", ")
    }
}

/// Split an utterance on its first recognized conjunction into (before,
/// after), trimmed. Returns `None` if no conjunction is present, even
/// though `Signals::has_conjunction` said otherwise — defensive, should not
/// happen given both are derived from the same trigger list.
fn split_on_conjunction(utterance: &str) -> Option<(String, String)> {
    let lowered = utterance.to_lowercase();
    for conj in CONJUNCTIONS {
        if let Some(idx) = lowered.find(conj) {
            let before = utterance[..idx].trim().to_string();
            let after = utterance[idx + conj.len()..].trim().to_string();
            if !before.is_empty() && !after.is_empty() {
                return Some((before, after));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::SignalExtractor;
    use std::collections::HashMap;

    fn full_scope() -> Scope {
        Scope {
            bank: Some("SBI".into()),
            category: Some("Credit Card".into()),
            product_name: None,
            alt_banks: vec![],
        }
    }

    fn registry() -> RegistrySnapshot {
        let mut banks = HashMap::new();
        banks.insert("sbi".to_string(), "SBI".to_string());
        banks.insert("hdfc".to_string(), "HDFC".to_string());
        RegistrySnapshot {
            banks,
            ..RegistrySnapshot::default()
        }
    }

    #[test]
    fn plain_count_routes_to_count() {
        let utterance = "how many SBI credit cards";
        let signals = SignalExtractor::extract(utterance);
        let evidence = Evidence {
            db_count: 16,
            faq_top_similarity: 0.15,
            faq_top_hit: None,
        };
        let ops = OperationValidator::validate(utterance, &full_scope(), &signals, &evidence, None, 0.60, &registry());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].tag(), "COUNT");
    }

    #[test]
    fn procedural_count_routes_to_faq_not_count() {
        let utterance = "how many steps to apply for a loan";
        let signals = SignalExtractor::extract(utterance);
        let evidence = Evidence {
            db_count: 25,
            faq_top_similarity: 0.88,
            faq_top_hit: None,
        };
        let ops = OperationValidator::validate(utterance, &Scope::default(), &signals, &evidence, None, 0.60, &registry());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].tag(), "FAQ");
    }

    #[test]
    fn conjunction_of_count_and_procedure_splits_into_two_ops() {
        let utterance = "how many SBI cards and how to apply";
        let signals = SignalExtractor::extract(utterance);
        let evidence = Evidence {
            db_count: 16,
            faq_top_similarity: 0.76,
            faq_top_hit: None,
        };
        let ops = OperationValidator::validate(utterance, &full_scope(), &signals, &evidence, None, 0.60, &registry());
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].tag(), "COUNT");
        assert_eq!(ops[1].tag(), "FAQ");
    }

    #[test]
    fn smart_fork_lists_under_inherited_bank() {
        let utterance = "credit cards";
        let signals = SignalExtractor::extract(utterance);
        let scope = Scope {
            bank: None,
            category: Some("Credit Card".into()),
            product_name: None,
            alt_banks: vec![],
        };
        let evidence = Evidence::unknown();
        let ops = OperationValidator::validate(utterance, &scope, &signals, &evidence, Some("SBI"), 0.60, &registry());
        assert_eq!(ops.len(), 1);
        match &ops[0] {
            Operation::List { scope, .. } => assert_eq!(scope.bank.as_deref(), Some("SBI")),
            other => panic!("expected List, got {other:?}"),
        }
    }

    #[test]
    fn bare_category_without_context_bank_clarifies() {
        let utterance = "list cards";
        let signals = SignalExtractor::extract(utterance);
        let scope = Scope {
            bank: None,
            category: Some("Credit Card".into()),
            product_name: None,
            alt_banks: vec![],
        };
        let evidence = Evidence::unknown();
        let ops = OperationValidator::validate(utterance, &scope, &signals, &evidence, None, 0.60, &registry());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].tag(), "CLARIFY");
    }

    #[test]
    fn two_banks_without_compare_signal_clarifies() {
        let utterance = "how many SBI and HDFC credit cards";
        let signals = SignalExtractor::extract(utterance);
        let scope = Scope {
            bank: Some("SBI".into()),
            category: Some("Credit Card".into()),
            product_name: None,
            alt_banks: vec!["HDFC".into()],
        };
        let evidence = Evidence {
            db_count: 16,
            faq_top_similarity: 0.1,
            faq_top_hit: None,
        };
        let ops = OperationValidator::validate(utterance, &scope, &signals, &evidence, None, 0.60, &registry());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].tag(), "CLARIFY");
    }

    #[test]
    fn compare_with_two_banks_is_not_count_or_faq() {
        let utterance = "compare SBI vs HDFC home loan";
        let signals = SignalExtractor::extract(utterance);
        let scope = Scope {
            bank: Some("SBI".into()),
            category: Some("Home Loan".into()),
            product_name: None,
            alt_banks: vec!["HDFC".into()],
        };
        let evidence = Evidence {
            db_count: 8,
            faq_top_similarity: 0.1,
            faq_top_hit: None,
        };
        let ops = OperationValidator::validate(utterance, &scope, &signals, &evidence, None, 0.60, &registry());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].tag(), "COMPARE");
    }

    #[test]
    fn compare_with_one_bank_downgrades_to_explain_all() {
        let utterance = "compare SBI home loan features";
        let signals = SignalExtractor::extract(utterance);
        let scope = Scope {
            bank: Some("SBI".into()),
            category: Some("Home Loan".into()),
            product_name: None,
            alt_banks: vec![],
        };
        let evidence = Evidence {
            db_count: 3,
            faq_top_similarity: 0.1,
            faq_top_hit: None,
        };
        let ops = OperationValidator::validate(utterance, &scope, &signals, &evidence, None, 0.60, &registry());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].tag(), "EXPLAIN_ALL");
    }

    #[test]
    fn count_with_zero_evidence_never_routes_to_count() {
        let utterance = "how many SBI credit cards";
        let signals = SignalExtractor::extract(utterance);
        let evidence = Evidence {
            db_count: 0,
            faq_top_similarity: 0.0,
            faq_top_hit: None,
        };
        let ops = OperationValidator::validate(utterance, &full_scope(), &signals, &evidence, None, 0.60, &registry());
        assert_ne!(ops[0].tag(), "COUNT");
    }

    #[test]
    fn missing_bank_clarify_prompt_names_known_banks() {
        let utterance = "list cards";
        let signals = SignalExtractor::extract(utterance);
        let scope = Scope {
            bank: None,
            category: Some("Credit Card".into()),
            product_name: None,
            alt_banks: vec![],
        };
        let evidence = Evidence::unknown();
        let ops = OperationValidator::validate(utterance, &scope, &signals, &evidence, None, 0.60, &registry());
        assert_eq!(ops.len(), 1);
        match &ops[0] {
            Operation::Clarify { prompt } => {
                assert!(prompt.contains("SBI"), "prompt missing bank list: {prompt}");
                assert!(prompt.contains("HDFC"), "prompt missing bank list: {prompt}");
            }
            other => panic!("expected Clarify, got {other:?}"),
        }
    }
}
