//! Shared application state for the router HTTP surface.
//!
//! Shape follows the teacher's `ob_poc_web::state::AppState`: a small
//! `#[derive(Clone)]` struct of `Arc`-wrapped collaborators built once at
//! startup and handed to every handler through axum's `with_state`.

use std::sync::Arc;

use catalog_store::memory::InMemoryProductStore;
use catalog_store::ProductStore;
use faq_index::memory::InMemoryFaqIndex;
use faq_index::FaqIndex;
use llm_client::LlmClient;
use router_core::{RouterConfig, RouterContext};

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<RouterContext>,
    pub llm: Option<Arc<dyn LlmClient>>,
}

impl AppState {
    /// Build state against in-memory fakes — the zero-configuration path,
    /// used both by tests and by anyone running the router without a
    /// database or FAQ index wired up yet.
    pub fn in_memory() -> Self {
        let store: Arc<dyn ProductStore> = Arc::new(InMemoryProductStore::default());
        let faq: Arc<dyn FaqIndex> = Arc::new(InMemoryFaqIndex::default());
        Self::new(store, faq, None, RouterConfig::default())
    }

    pub fn new(
        store: Arc<dyn ProductStore>,
        faq: Arc<dyn FaqIndex>,
        llm: Option<Arc<dyn LlmClient>>,
        config: RouterConfig,
    ) -> Self {
        let router = Arc::new(RouterContext::new(
            store,
            faq,
            router_core::create_conversation_store(),
            config,
        ));
        Self { router, llm }
    }
}
