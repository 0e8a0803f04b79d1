//! Response orchestrator
//!
//! One entry point: `process_message`. Routing priority is fixed: an
//! active contact form owns the turn before any intent classification
//! happens, so form answers are never misread as queries.

use std::sync::Arc;

use support_agent_config::{AgentSettings, RetrievalSettings};
use support_agent_core::{
    ContactFormData, ContactFormState, ContactRequest, ContactRequestSink, Error, Intent,
    LanguageModel, Result, RetrievalOutcome, ScoredPassage, TurnOutcome, TurnRole,
};
use support_agent_rag::Retriever;
use support_agent_session::SessionStore;

use crate::contact_form;
use crate::intent::IntentClassifier;
use crate::prompts::{self, CannedText};
use crate::response::{self, AnswerKind};

pub struct SupportAgent {
    store: SessionStore,
    llm: Arc<dyn LanguageModel>,
    retriever: Arc<Retriever>,
    contacts: Option<Arc<dyn ContactRequestSink>>,
    classifier: IntentClassifier,
    text: CannedText,
    agent_settings: AgentSettings,
    retrieval_settings: RetrievalSettings,
}

impl SupportAgent {
    pub fn new(
        store: SessionStore,
        llm: Arc<dyn LanguageModel>,
        retriever: Arc<Retriever>,
        agent_settings: AgentSettings,
        retrieval_settings: RetrievalSettings,
    ) -> Self {
        let classifier = IntentClassifier::new(Arc::clone(&llm));
        let text = CannedText::new(&agent_settings);
        Self {
            store,
            llm,
            retriever,
            contacts: None,
            classifier,
            text,
            agent_settings,
            retrieval_settings,
        }
    }

    pub fn with_contact_sink(mut self, sink: Arc<dyn ContactRequestSink>) -> Self {
        self.contacts = Some(sink);
        self
    }

    pub fn canned_text(&self) -> &CannedText {
        &self.text
    }

    /// Handle one user message for a session.
    ///
    /// `SessionNotFound` is the only error callers see; every other
    /// failure becomes an apologetic reply and the session carries on.
    pub async fn process_message(&self, session_id: &str, message: &str) -> Result<TurnOutcome> {
        if !self.store.update_session_activity(session_id).await {
            return Err(Error::SessionNotFound(session_id.to_string()));
        }

        self.store
            .append_message_to_history(session_id, TurnRole::User, message)
            .await;

        let outcome = match self.respond(session_id, message).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_session_not_found() => return Err(e),
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "Turn failed");
                TurnOutcome::new(self.text.apology(), Intent::Unclear)
            }
        };

        self.store
            .append_message_to_history(session_id, TurnRole::Bot, &outcome.response)
            .await;

        if outcome.cacheable
            && outcome.response.len() > self.agent_settings.cache_min_response_len
        {
            self.store
                .cache_response(session_id, message, &outcome.response)
                .await;
        }

        tracing::info!(
            session_id = %session_id,
            intent = %outcome.intent,
            from_cache = outcome.from_cache,
            is_goodbye = outcome.is_goodbye,
            "Turn complete"
        );

        Ok(outcome)
    }

    async fn respond(&self, session_id: &str, message: &str) -> Result<TurnOutcome> {
        let form_state = self.store.contact_form_state(session_id).await;
        if form_state.is_active() {
            return self.handle_form_turn(session_id, form_state, message).await;
        }

        let previous_query = self.store.get_last_user_query(session_id, true).await;
        let intent = self
            .classifier
            .classify(message, previous_query.as_deref())
            .await;

        match intent {
            Intent::Greeting => {
                let reply = self
                    .generate_or(&prompts::greeting_prompt(&self.text), self.text.greeting_fallback())
                    .await;
                Ok(TurnOutcome::new(reply, Intent::Greeting))
            }
            Intent::CasualChat => {
                let reply = self
                    .generate_or(
                        &prompts::casual_prompt(&self.text, message),
                        self.text.casual_fallback(),
                    )
                    .await;
                Ok(TurnOutcome::new(reply, Intent::CasualChat))
            }
            Intent::Goodbye => {
                let reply = self
                    .generate_or(&prompts::goodbye_prompt(&self.text), self.text.goodbye_fallback())
                    .await;
                Ok(TurnOutcome::new(reply, Intent::Goodbye).goodbye())
            }
            Intent::Unclear => Ok(TurnOutcome::new(self.text.unclear_reply(), Intent::Unclear)),
            Intent::ContactRequest => self.handle_contact_request(session_id, message).await,
            Intent::Query => self.handle_query(session_id, message).await,
            Intent::Followup => {
                self.handle_followup(session_id, message, previous_query).await
            }
        }
    }

    /// Generate with a static fallback; these paths must never fail a turn.
    async fn generate_or(&self, prompt: &str, fallback: String) -> String {
        match self.llm.generate(prompt).await {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => fallback,
            Err(e) => {
                tracing::warn!(error = %e, "Generation failed, using canned reply");
                fallback
            }
        }
    }

    async fn handle_form_turn(
        &self,
        session_id: &str,
        state: ContactFormState,
        message: &str,
    ) -> Result<TurnOutcome> {
        let data = self.store.contact_form_data(session_id).await;
        let step = contact_form::advance(state, message, data, &self.text);

        if step.completed {
            let request = ContactRequest::from_form(session_id, &step.data);
            match &self.contacts {
                Some(sink) => {
                    if let Err(e) = sink.create(&request).await {
                        // the user already heard "all set"; losing the
                        // record is an ops problem, not a conversation one
                        tracing::error!(
                            session_id = %session_id,
                            request_id = %request.request_id,
                            error = %e,
                            "Contact request persist failed"
                        );
                    }
                }
                None => {
                    tracing::warn!(
                        session_id = %session_id,
                        request_id = %request.request_id,
                        "No contact store configured, request not persisted"
                    );
                }
            }
            self.store
                .set_contact_form_data(session_id, &ContactFormData::default())
                .await;
            self.store
                .set_contact_form_state(session_id, ContactFormState::Completed)
                .await;
        } else {
            self.store
                .set_contact_form_data(session_id, &step.data)
                .await;
            self.store
                .set_contact_form_state(session_id, step.next_state)
                .await;
        }

        Ok(TurnOutcome::new(step.reply, Intent::ContactRequest))
    }

    /// An explicit "contact me" skips the consent question
    async fn handle_contact_request(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<TurnOutcome> {
        let mut data = self.store.contact_form_data(session_id).await;
        data.original_query = Some(message.to_string());

        let (next_state, reply) = if data.has_contact_fields() {
            let name = data.name.clone().unwrap_or_default();
            (
                ContactFormState::CollectingDatetime,
                self.text.ask_datetime_reentry(&name),
            )
        } else {
            (ContactFormState::CollectingName, self.text.ask_name())
        };

        self.store.set_contact_form_data(session_id, &data).await;
        self.store.set_contact_form_state(session_id, next_state).await;

        Ok(TurnOutcome::new(reply, Intent::ContactRequest))
    }

    async fn handle_query(&self, session_id: &str, message: &str) -> Result<TurnOutcome> {
        if let Some(hit) = self.store.cached_response(session_id, message).await {
            tracing::debug!(session_id = %session_id, "Query served from session cache");
            let ack = response::cache_acknowledgment(&hit.original_query);
            return Ok(
                TurnOutcome::new(format!("{ack}{}", hit.response), Intent::Query).from_cache(),
            );
        }

        let passages = self
            .retrieve_lenient(message, self.retrieval_settings.top_n)
            .await;

        let outcome = if passages.is_empty() {
            RetrievalOutcome::NoRelevantInformation
        } else {
            let answer = self
                .llm
                .generate(&prompts::answer_prompt(&self.text, message, &passages))
                .await?;
            RetrievalOutcome::Answered(answer)
        };

        match outcome {
            RetrievalOutcome::Answered(answer) => {
                let polished = response::polish(
                    &answer,
                    AnswerKind::Query,
                    &self.text,
                    self.agent_settings.min_response_len,
                    self.agent_settings.engagement_threshold,
                );
                Ok(TurnOutcome::new(polished, Intent::Query).cacheable())
            }
            RetrievalOutcome::NoRelevantInformation => {
                // hand the question over to a human, pending consent
                let mut data = self.store.contact_form_data(session_id).await;
                data.original_query = Some(message.to_string());
                self.store.set_contact_form_data(session_id, &data).await;
                self.store
                    .set_contact_form_state(session_id, ContactFormState::AskingConsent)
                    .await;
                Ok(TurnOutcome::new(self.text.consent_prompt(), Intent::Query))
            }
        }
    }

    async fn handle_followup(
        &self,
        session_id: &str,
        message: &str,
        previous_query: Option<String>,
    ) -> Result<TurnOutcome> {
        let base = previous_query.clone().unwrap_or_else(|| message.to_string());
        let expanded =
            format!("{base} - provide more detailed information and additional context");

        let passages = self
            .retrieve_lenient(&expanded, self.retrieval_settings.followup_top_n)
            .await;

        if passages.is_empty() {
            return Ok(TurnOutcome::new(
                self.text.no_additional_info(),
                Intent::Followup,
            ));
        }

        let answer = self
            .llm
            .generate(&prompts::followup_prompt(&self.text, &base, message, &passages))
            .await?;

        let polished = response::polish(
            &answer,
            AnswerKind::Followup,
            &self.text,
            self.agent_settings.min_response_len,
            self.agent_settings.engagement_threshold,
        );

        Ok(TurnOutcome::new(polished, Intent::Followup))
    }

    /// Retrieval failures read as "nothing relevant": the turn degrades
    /// to the consent path instead of erroring out.
    async fn retrieve_lenient(&self, query: &str, n_results: usize) -> Vec<ScoredPassage> {
        match self.retriever.retrieve(query, n_results).await {
            Ok(passages) => passages,
            Err(e) => {
                tracing::warn!(error = %e, "Retrieval failed, treating as no matches");
                Vec::new()
            }
        }
    }
}
