//! Shared application state

use std::sync::Arc;

use support_agent_agent::SupportAgent;
use support_agent_config::Settings;
use support_agent_core::{LanguageModel, VectorSearch};
use support_agent_persistence::ConversationArchive;
use support_agent_session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub agent: Arc<SupportAgent>,
    pub store: SessionStore,
    pub llm: Arc<dyn LanguageModel>,
    pub search: Arc<dyn VectorSearch>,
    /// Present only when the durable store is up; conversations are
    /// archived when a session says goodbye.
    pub archive: Option<Arc<ConversationArchive>>,
}

impl AppState {
    pub fn new(
        settings: Arc<Settings>,
        agent: Arc<SupportAgent>,
        store: SessionStore,
        llm: Arc<dyn LanguageModel>,
        search: Arc<dyn VectorSearch>,
    ) -> Self {
        Self {
            settings,
            agent,
            store,
            llm,
            search,
            archive: None,
        }
    }

    pub fn with_archive(mut self, archive: Arc<ConversationArchive>) -> Self {
        self.archive = Some(archive);
        self
    }
}
