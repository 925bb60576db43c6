//! The smart router: the façade that owns the end-to-end pipeline. Step
//! order follows SPEC_FULL.md §4.5, staged the way the teacher's
//! `ob_agentic::lexicon::pipeline::LexiconPipeline::process` stages its own
//! multi-step pipeline.

use std::sync::Arc;
use uuid::Uuid;

use catalog_store::ProductStore;
use faq_index::FaqIndex;

use crate::config::RouterConfig;
use crate::evidence::EvidenceRetriever;
use crate::followup::{FollowupError, FollowupResolver};
use crate::operation::{Operation, RoutingDebug, RoutingDecision};
use crate::registry::EntityRegistry;
use crate::scope::ScopeResolver;
use crate::signals::SignalExtractor;
use crate::state::{commit_last_turn, get_last_turn, ConversationStore};
use crate::validator::OperationValidator;

pub struct RouterContext {
    pub registry: Arc<EntityRegistry>,
    pub conversation: ConversationStore,
    pub evidence: EvidenceRetriever,
    pub config: RouterConfig,
}

impl RouterContext {
    pub fn new(
        store: Arc<dyn ProductStore>,
        faq: Arc<dyn FaqIndex>,
        conversation: ConversationStore,
        config: RouterConfig,
    ) -> Self {
        let registry = Arc::new(EntityRegistry::new(store.clone()));
        let evidence = EvidenceRetriever::new(store, faq, config.evidence_deadline);
        Self {
            registry,
            conversation,
            evidence,
            config,
        }
    }
}

pub struct SmartRouter;

impl SmartRouter {
    #[tracing::instrument(skip(ctx), fields(session_id = %session_id))]
    pub async fn route(ctx: &RouterContext, session_id: Uuid, utterance: &str) -> RoutingDecision {
        let deadline = ctx.config.request_deadline;
        match tokio::time::timeout(deadline, Self::route_inner(ctx, session_id, utterance)).await {
            Ok(decision) => decision,
            Err(_) => {
                tracing::warn!("routing request exceeded its deadline");
                RoutingDecision::clarify(
                    "Sorry, that took longer than expected — could you try again?",
                )
            }
        }
    }

    async fn route_inner(ctx: &RouterContext, session_id: Uuid, utterance: &str) -> RoutingDecision {
        // Step 1: greeting short-circuit — a canned reply, never the LLM.
        let normalized = utterance.trim().to_lowercase();
        if ctx.config.greetings.iter().any(|g| g == &normalized) {
            return RoutingDecision::single(Operation::Greeting {
                message: ctx.config.greeting_response.clone(),
            });
        }

        let last_turn = get_last_turn(&ctx.conversation, session_id, ctx.config.session_ttl).await;

        ctx.registry
            .refresh_if_empty()
            .await
            .unwrap_or_else(|e| tracing::warn!(error = %e, "entity registry refresh failed"));
        let registry_snapshot = ctx.registry.snapshot().await;
        if registry_snapshot.is_empty() {
            return RoutingDecision::clarify(
                "I don't have any product data loaded yet — please try again shortly.",
            );
        }

        // Step 2: follow-up rewriting. The registry snapshot must be ready
        // first so Rule 4 can check bank membership exactly, rather than
        // guessing from sentence shape.
        let (effective_utterance, rewritten, forced_intent) =
            match FollowupResolver::resolve(utterance, &last_turn, &registry_snapshot) {
                Ok(Some(rewrite)) => (rewrite.utterance.clone(), Some(rewrite.utterance), rewrite.forced_intent),
                Ok(None) => (utterance.to_string(), None, None),
                Err(FollowupError::OrdinalOutOfRange { available, .. }) => {
                    return RoutingDecision::clarify(format!(
                        "I only have {available} items in the last list."
                    ));
                }
                Err(FollowupError::NoPriorList) => {
                    return RoutingDecision::clarify(
                        "I don't have a prior list to refer to — could you ask again with the bank and product type?",
                    );
                }
            };

        // Step 3: scope resolution, inheriting last_bank only when the
        // utterance itself did not resolve a bank.
        let mut scope = ScopeResolver::resolve(&effective_utterance, &registry_snapshot);
        if scope.bank.is_none() {
            if let Some(bank) = &last_turn.last_bank {
                if forced_intent == Some("LIST") || forced_intent == Some("EXPLAIN") {
                    scope.bank = Some(bank.clone());
                }
            }
        }

        // Step 4: signal extraction.
        let signals = SignalExtractor::extract(&effective_utterance);

        // Step 5: evidence retrieval.
        let evidence = ctx.evidence.retrieve(&scope, &effective_utterance).await;

        // Step 6: operation validation.
        let operations = OperationValidator::validate(
            &effective_utterance,
            &scope,
            &signals,
            &evidence,
            last_turn.last_bank.as_deref(),
            ctx.config.faq_similarity_threshold,
            &registry_snapshot,
        );

        let mut decision = RoutingDecision {
            operations,
            rewritten_utterance: rewritten.clone(),
            debug: None,
        }
        .with_debug(RoutingDebug { signals, evidence, rewritten });

        // Step 7: commit conversation state unless the decision is CLARIFY.
        if !decision.is_clarify() {
            let mut next_turn = last_turn;
            next_turn.record_committed_turn(
                decision.operations[0].tag(),
                scope.bank.clone(),
                scope.category.clone(),
                utterance,
            );
            commit_last_turn(&ctx.conversation, session_id, next_turn).await;
        }

        if decision.operations.len() > 1 {
            decision.operations[1] = std::mem::replace(
                &mut decision.operations[1],
                Operation::LlmFallback {
                    utterance: String::new(),
                },
            )
            .with_suppressed_greeting();
        }

        decision
    }

    /// Record a successfully-executed LIST's product names into
    /// conversation state, so a later ordinal reference can resolve. The
    /// router itself never executes handlers, so this is a separate,
    /// explicit post-commit step callers invoke after running the LIST
    /// handler.
    pub async fn record_list_result(ctx: &RouterContext, session_id: Uuid, names: Vec<String>) {
        let mut turn = get_last_turn(&ctx.conversation, session_id, ctx.config.session_ttl).await;
        turn.record_product_list(names);
        commit_last_turn(&ctx.conversation, session_id, turn).await;
    }
}
