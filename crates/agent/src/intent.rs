//! Intent classification
//!
//! LLM-labelled with a deterministic keyword fallback: a model outage
//! degrades classification quality, never availability. The fallback
//! never yields `Unclear`, so degraded mode always picks an actionable
//! route (defaulting to `query`).

use std::sync::Arc;

use support_agent_core::{Intent, LanguageModel};

use crate::prompts::classification_prompt;

/// Phrases that signal the user wants a human. Checked first: a message
/// like "can I talk to someone about refunds" is a contact request, not
/// a refund query.
const CONTACT_PHRASES: &[&str] = &[
    "talk to someone",
    "talk to a human",
    "talk to an agent",
    "talk to support",
    "speak to someone",
    "speak with",
    "contact me",
    "call me",
    "reach out",
    "connect me",
    "get in touch",
    "customer service",
    "real person",
];

const GREETING_WORDS: &[&str] = &["hi", "hello", "hey", "good morning", "good afternoon", "good evening"];

const GOODBYE_PHRASES: &[&str] = &[
    "bye",
    "goodbye",
    "see you",
    "that's all",
    "thats all",
    "thanks, that's all",
    "thank you, bye",
    "perfect",
    "appreciate it",
    "that helps",
    "thanks a lot",
];

pub struct IntentClassifier {
    llm: Arc<dyn LanguageModel>,
}

impl IntentClassifier {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Classify a message, given the previous user query for followup
    /// context (if any).
    pub async fn classify(&self, message: &str, previous_query: Option<&str>) -> Intent {
        let prompt = classification_prompt(message, previous_query);
        match self.llm.generate(&prompt).await {
            Ok(label) => {
                let intent = parse_intent_label(&label);
                tracing::debug!(intent = %intent, "Intent classified by model");
                intent
            }
            Err(e) => {
                tracing::warn!(error = %e, "Intent model unavailable, using keyword fallback");
                keyword_fallback(message)
            }
        }
    }
}

/// Map a model label to an intent by substring, in a fixed priority
/// order. Model output sometimes carries more than one category-like
/// token ("casual chat / query"); the order makes those resolve
/// deterministically.
pub fn parse_intent_label(label: &str) -> Intent {
    let label = label.to_lowercase();
    if label.contains("greeting") {
        Intent::Greeting
    } else if label.contains("casual") {
        Intent::CasualChat
    } else if label.contains("followup") || label.contains("follow-up") || label.contains("follow up") {
        Intent::Followup
    } else if label.contains("contact") {
        Intent::ContactRequest
    } else if label.contains("query") || label.contains("question") {
        Intent::Query
    } else if label.contains("goodbye") || label.contains("bye") {
        Intent::Goodbye
    } else {
        Intent::Unclear
    }
}

/// Deterministic classification used when the model is unreachable
pub fn keyword_fallback(message: &str) -> Intent {
    let normalized = message.trim().to_lowercase();

    if CONTACT_PHRASES.iter().any(|p| normalized.contains(p)) {
        return Intent::ContactRequest;
    }

    let word_count = normalized.split_whitespace().count();
    if word_count <= 4
        && GREETING_WORDS
            .iter()
            .any(|g| normalized == *g || normalized.starts_with(&format!("{g} ")) || normalized.starts_with(&format!("{g},")) || normalized.starts_with(&format!("{g}!")))
    {
        return Intent::Greeting;
    }

    // single-word markers match whole words only ("maybe" is not "bye")
    let words: Vec<&str> = normalized
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .collect();
    if GOODBYE_PHRASES.iter().any(|p| {
        if p.contains(' ') {
            normalized.contains(p)
        } else {
            words.contains(p)
        }
    }) {
        return Intent::Goodbye;
    }

    // anything substantive is worth a retrieval attempt
    Intent::Query
}
