//! The evidence-based query router for a multi-bank banking products/FAQ
//! chatbot backend. Given an utterance, decides which deterministic
//! handler should serve it, validating keyword signals against a product
//! catalog and a semantic FAQ index before committing to an operation.

pub mod config;
pub mod error;
pub mod evidence;
pub mod followup;
pub mod operation;
pub mod registry;
pub mod router;
pub mod scope;
pub mod signals;
pub mod state;
pub mod validator;

pub use config::RouterConfig;
pub use error::RouterError;
pub use evidence::{Evidence, EvidenceRetriever};
pub use followup::{FollowupError, FollowupResolver, Rewrite};
pub use operation::{Operation, RoutingDebug, RoutingDecision};
pub use registry::{run_refresh_loop, EntityRegistry, RegistrySnapshot};
pub use router::{RouterContext, SmartRouter};
pub use scope::{Scope, ScopeResolver};
pub use signals::{SignalExtractor, Signals};
pub use state::{
    clear_session, commit_last_turn, create_conversation_store, get_last_turn, ConversationStore,
    LastTurn,
};
pub use validator::OperationValidator;
