//! End-to-end conversation flows against mock collaborators

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use support_agent_agent::SupportAgent;
use support_agent_config::{AgentSettings, RetrievalSettings};
use support_agent_core::{
    ContactRequest, ContactRequestSink, Error, Intent, LanguageModel, Result, ScoredPassage,
    VectorSearch,
};
use support_agent_rag::{Retriever, RetrieverConfig};
use support_agent_session::{InMemorySessionBackend, SessionStore};

/// Deterministic model: classifies by looking at the quoted message,
/// answers everything else with a fixed grounded reply.
struct ScriptedLlm;

#[async_trait]
impl LanguageModel for ScriptedLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if prompt.contains("Reply with only the category name") {
            let label = if prompt.contains("\"hello\"") {
                "greeting"
            } else if prompt.contains("that's all") {
                "goodbye"
            } else if prompt.contains("tell me more") {
                "followup"
            } else {
                "query"
            };
            return Ok(label.to_string());
        }
        if prompt.contains("just greeted you") {
            return Ok("Hello! How can I help you today?".to_string());
        }
        if prompt.contains("ending the conversation") {
            return Ok("Take care, goodbye!".to_string());
        }
        Ok("Refunds are processed within five business days of the return arriving at our warehouse.".to_string())
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Knows about refunds; draws a blank on anything mentioning "quantum".
struct RefundSearch;

#[async_trait]
impl VectorSearch for RefundSearch {
    async fn search(&self, query: &str, n_results: usize) -> Result<Vec<ScoredPassage>> {
        if query.contains("quantum") {
            return Ok(Vec::new());
        }
        Ok(vec![
            ScoredPassage::new("Refunds are processed within five business days.", 0.3)
                .with_source("refunds.md"),
            ScoredPassage::new("Returns must be initiated within 30 days.", 0.8)
                .with_source("returns.md"),
        ]
        .into_iter()
        .take(n_results)
        .collect())
    }

    async fn collection_size(&self) -> Result<usize> {
        Ok(2)
    }

    fn name(&self) -> &str {
        "refund_search"
    }
}

#[derive(Default)]
struct CapturingSink {
    requests: Mutex<Vec<ContactRequest>>,
}

#[async_trait]
impl ContactRequestSink for CapturingSink {
    async fn create(&self, request: &ContactRequest) -> Result<()> {
        self.requests.lock().push(request.clone());
        Ok(())
    }
}

struct FailingSink;

#[async_trait]
impl ContactRequestSink for FailingSink {
    async fn create(&self, _request: &ContactRequest) -> Result<()> {
        Err(Error::Persistence("connection refused".into()))
    }
}

fn build_agent(sink: Arc<dyn ContactRequestSink>) -> (SupportAgent, SessionStore) {
    let store = SessionStore::new(Arc::new(InMemorySessionBackend::new(Duration::from_secs(60))));
    let retriever = Arc::new(Retriever::new(
        Arc::new(RefundSearch),
        RetrieverConfig {
            rerank_enabled: false,
            ..Default::default()
        },
    ));
    let agent = SupportAgent::new(
        store.clone(),
        Arc::new(ScriptedLlm),
        retriever,
        AgentSettings::default(),
        RetrievalSettings::default(),
    )
    .with_contact_sink(sink);
    (agent, store)
}

#[tokio::test]
async fn test_unknown_session_is_an_error() {
    let (agent, _store) = build_agent(Arc::new(CapturingSink::default()));
    let result = agent.process_message("no-such-session", "hello").await;
    assert!(matches!(result, Err(Error::SessionNotFound(_))));
}

#[tokio::test]
async fn test_greeting_then_query_is_answered() {
    let (agent, store) = build_agent(Arc::new(CapturingSink::default()));
    let session = store.create_session().await.unwrap();

    let greeting = agent.process_message(&session, "hello").await.unwrap();
    assert_eq!(greeting.intent, Intent::Greeting);
    assert!(!greeting.is_goodbye);

    let answer = agent
        .process_message(&session, "what is the refund policy")
        .await
        .unwrap();
    assert_eq!(answer.intent, Intent::Query);
    assert!(answer.response.contains("five business days"));
    assert!(answer.cacheable);
}

#[tokio::test]
async fn test_repeat_query_served_from_cache() {
    let (agent, store) = build_agent(Arc::new(CapturingSink::default()));
    let session = store.create_session().await.unwrap();

    let first = agent
        .process_message(&session, "what is the refund policy?")
        .await
        .unwrap();
    assert!(!first.from_cache);

    let second = agent
        .process_message(&session, "What is the REFUND policy")
        .await
        .unwrap();
    assert!(second.from_cache);
    assert!(second.response.contains("five business days"));
    // the acknowledgment references the earlier phrasing
    assert!(second.response.contains("refund policy"));
}

#[tokio::test]
async fn test_unanswerable_query_runs_full_contact_flow() {
    let sink = Arc::new(CapturingSink::default());
    let (agent, store) = build_agent(sink.clone());
    let session = store.create_session().await.unwrap();

    // nothing relevant -> consent question, not free text
    let consent = agent
        .process_message(&session, "do you support quantum widgets")
        .await
        .unwrap();
    assert!(consent.response.contains("contact you"));

    let ask_name = agent.process_message(&session, "yes").await.unwrap();
    assert_eq!(ask_name.intent, Intent::ContactRequest);
    assert!(ask_name.response.contains("name"));

    // invalid email re-asks without advancing
    agent.process_message(&session, "Priya Sharma").await.unwrap();
    let retry = agent.process_message(&session, "not-an-email").await.unwrap();
    assert!(retry.response.contains("email"));

    agent
        .process_message(&session, "priya@example.com")
        .await
        .unwrap();
    agent
        .process_message(&session, "+91 98765 43210")
        .await
        .unwrap();
    agent
        .process_message(&session, "Tomorrow 3pm")
        .await
        .unwrap();
    let done = agent.process_message(&session, "IST").await.unwrap();
    assert!(done.response.contains("All set"));

    let requests = sink.requests.lock();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.name, "Priya Sharma");
    assert_eq!(request.mobile, "+919876543210");
    assert_eq!(
        request.original_query.as_deref(),
        Some("do you support quantum widgets")
    );
    drop(requests);

    // accumulator is wiped after completion
    let data = store.contact_form_data(&session).await;
    assert!(data.is_empty());

    // the turn after completion is classified normally again
    let after = agent
        .process_message(&session, "what is the refund policy")
        .await
        .unwrap();
    assert_eq!(after.intent, Intent::Query);
}

#[tokio::test]
async fn test_consent_decline_returns_to_normal_flow() {
    let (agent, store) = build_agent(Arc::new(CapturingSink::default()));
    let session = store.create_session().await.unwrap();

    agent
        .process_message(&session, "do you support quantum widgets")
        .await
        .unwrap();
    let declined = agent.process_message(&session, "no thanks").await.unwrap();
    assert!(declined.response.contains("No problem"));

    assert!(store.contact_form_data(&session).await.is_empty());

    let answer = agent
        .process_message(&session, "what is the refund policy")
        .await
        .unwrap();
    assert_eq!(answer.intent, Intent::Query);
}

#[tokio::test]
async fn test_persist_failure_does_not_retract_success() {
    let (agent, store) = build_agent(Arc::new(FailingSink));
    let session = store.create_session().await.unwrap();

    agent
        .process_message(&session, "do you support quantum widgets")
        .await
        .unwrap();
    agent.process_message(&session, "yes").await.unwrap();
    agent.process_message(&session, "Priya").await.unwrap();
    agent
        .process_message(&session, "priya@example.com")
        .await
        .unwrap();
    agent
        .process_message(&session, "+919876543210")
        .await
        .unwrap();
    agent.process_message(&session, "Tomorrow 3pm").await.unwrap();

    let done = agent.process_message(&session, "IST").await.unwrap();
    assert!(done.response.contains("All set"));
}

#[tokio::test]
async fn test_goodbye_flags_session_end() {
    let (agent, store) = build_agent(Arc::new(CapturingSink::default()));
    let session = store.create_session().await.unwrap();

    let bye = agent
        .process_message(&session, "thanks, that's all")
        .await
        .unwrap();
    assert_eq!(bye.intent, Intent::Goodbye);
    assert!(bye.is_goodbye);
}

#[tokio::test]
async fn test_followup_widens_previous_query() {
    let (agent, store) = build_agent(Arc::new(CapturingSink::default()));
    let session = store.create_session().await.unwrap();

    agent
        .process_message(&session, "what is the refund policy")
        .await
        .unwrap();
    let followup = agent
        .process_message(&session, "tell me more")
        .await
        .unwrap();
    assert_eq!(followup.intent, Intent::Followup);
    assert!(!followup.cacheable);
    assert!(!followup.response.is_empty());
}
