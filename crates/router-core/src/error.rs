//! Errors that abort startup. Routing-time failures are never represented
//! here — they are recovered into a `RoutingDecision` (CLARIFY or
//! LLM_FALLBACK) by the validator, per the error-handling design.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("failed to connect to the product store: {0}")]
    StoreConnection(String),

    #[error("invalid router configuration: {0}")]
    Config(String),
}
