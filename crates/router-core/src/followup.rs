//! Follow-up resolver: a pure function from (utterance, `LastTurn`) to an
//! optional rewrite, deliberately held apart from the router to break the
//! resolver/router reference cycle (see SPEC_FULL.md Design Notes).
//! Ordinal/pronoun handling style follows the teacher's
//! `ob_agentic::lexicon::tokenizer::SessionSalience::resolve_pronoun`.

use crate::registry::RegistrySnapshot;
use crate::state::LastTurn;

#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    pub utterance: String,
    pub forced_intent: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FollowupError {
    OrdinalOutOfRange { requested: usize, available: usize },
    NoPriorList,
}

pub struct FollowupResolver;

impl FollowupResolver {
    /// Returns `Ok(None)` when no rule applies (pass through unchanged),
    /// `Ok(Some(rewrite))` when a rule rewrote the utterance, or `Err` when
    /// a rule matched but could not be satisfied (ordinal out of range,
    /// no prior list to reference).
    pub fn resolve(
        utterance: &str,
        last_turn: &LastTurn,
        registry: &RegistrySnapshot,
    ) -> Result<Option<Rewrite>, FollowupError> {
        let trimmed = utterance.trim();
        let lowered = trimmed.to_lowercase();

        // Rule 1: ordinal reference into the last product list.
        if let Some(index) = parse_ordinal(&lowered) {
            if last_turn.last_product_list.is_empty() {
                return Err(FollowupError::NoPriorList);
            }
            let available = last_turn.last_product_list.len();
            let zero_based = match index {
                Ordinal::FromStart(n) => n.checked_sub(1),
                Ordinal::Last => available.checked_sub(1),
            };
            let Some(zero_based) = zero_based else {
                return Err(FollowupError::OrdinalOutOfRange {
                    requested: 0,
                    available,
                });
            };
            let Some(name) = last_turn.last_product_list.get(zero_based) else {
                let requested = match index {
                    Ordinal::FromStart(n) => n,
                    Ordinal::Last => available,
                };
                return Err(FollowupError::OrdinalOutOfRange { requested, available });
            };
            return Ok(Some(Rewrite {
                utterance: format!("explain {name}"),
                forced_intent: Some("EXPLAIN"),
            }));
        }

        // Rule 2: "list them" / "show them" after a COUNT with known scope.
        if is_them_reference(&lowered) {
            if last_turn.last_intent.as_deref() == Some("COUNT") {
                if let (Some(bank), Some(category)) = (&last_turn.last_bank, &last_turn.last_category) {
                    return Ok(Some(Rewrite {
                        utterance: format!("list {bank} {category}"),
                        forced_intent: Some("LIST"),
                    }));
                }
            }
        }

        // Rule 3: bare "why"/"how"/"what about X" after EXPLAIN/COMPARE —
        // prepend the previous product/bank context so the rewritten
        // utterance is self-contained.
        if let Some(subject) = bare_follow_up_subject(&lowered) {
            if matches!(last_turn.last_intent.as_deref(), Some("EXPLAIN") | Some("COMPARE")) {
                if let Some(bank) = &last_turn.last_bank {
                    let qualifier = subject.unwrap_or_default();
                    let rewritten = if qualifier.is_empty() {
                        format!("explain {bank}")
                    } else {
                        format!("explain {bank} {qualifier}")
                    };
                    return Ok(Some(Rewrite {
                        utterance: rewritten,
                        forced_intent: None,
                    }));
                }
            }
        }

        // Rule 4: the utterance is *exactly* a known bank name (§4.6) with a
        // remembered category — an exact registry lookup, not a heuristic,
        // so a bare category like "home loan" can never be mistaken for a
        // bank and pre-empt the smart fork (validator rule 5).
        if let Some(category) = &last_turn.last_category {
            if let Some(canonical_bank) = registry.banks.get(&lowered) {
                return Ok(Some(Rewrite {
                    utterance: format!("list {canonical_bank} {category}"),
                    forced_intent: Some("LIST"),
                }));
            }
        }

        // Rule 5: nothing applies, pass through.
        Ok(None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Ordinal {
    FromStart(usize),
    Last,
}

const ORDINAL_WORDS: &[(&str, usize)] = &[
    ("first", 1),
    ("second", 2),
    ("third", 3),
    ("fourth", 4),
    ("fifth", 5),
    ("sixth", 6),
    ("seventh", 7),
    ("eighth", 8),
    ("ninth", 9),
    ("tenth", 10),
];

fn parse_ordinal(lowered: &str) -> Option<Ordinal> {
    if !lowered.contains("one") && !lowered.contains("#") && !lowered.contains("number") {
        if !ORDINAL_WORDS.iter().any(|(word, _)| lowered.contains(word)) && !lowered.contains("last") {
            return None;
        }
    }

    if lowered.contains("last") {
        return Some(Ordinal::Last);
    }

    for (word, n) in ORDINAL_WORDS {
        if lowered.contains(word) {
            return Some(Ordinal::FromStart(*n));
        }
    }

    // "#N" or "number N"
    let digits: String = lowered.chars().filter(|c| c.is_ascii_digit()).collect();
    if (lowered.contains('#') || lowered.contains("number")) && !digits.is_empty() {
        if let Ok(n) = digits.parse::<usize>() {
            return Some(Ordinal::FromStart(n));
        }
    }

    None
}

fn is_them_reference(lowered: &str) -> bool {
    let starts_with_verb = lowered.starts_with("list") || lowered.starts_with("show");
    starts_with_verb && (lowered.contains("them") || lowered.contains("those") || lowered.contains("these"))
}

/// Returns `Some(subject)` when the utterance is a bare continuation word,
/// where `subject` is anything meaningful left after stripping the cue
/// (e.g. "what about fees" -> Some("fees")).
fn bare_follow_up_subject(lowered: &str) -> Option<Option<String>> {
    for cue in ["what about ", "why", "how"] {
        if lowered.starts_with(cue) {
            let remainder = lowered[cue.len()..].trim();
            return Some(if remainder.is_empty() {
                None
            } else {
                Some(remainder.to_string())
            });
        }
    }
    None
}
