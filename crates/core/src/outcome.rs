//! Turn and retrieval outcomes

use serde::{Deserialize, Serialize};

use crate::intent::Intent;

/// Result of the knowledge-grounded answer path
///
/// Empty retrieval is a first-class outcome rather than a magic response
/// string, so the orchestrator can route it (to the contact-consent
/// prompt) without inspecting answer text.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome {
    /// A grounded answer was produced
    Answered(String),
    /// Nothing in the collection was relevant enough to answer from
    NoRelevantInformation,
}

/// The orchestrator's verdict for one user message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Text to show the user
    pub response: String,
    /// Classified intent (the contact form reports `contact_request`
    /// while it owns the turn)
    pub intent: Intent,
    /// The session should wind down after this reply
    pub is_goodbye: bool,
    /// Whether the reply is worth caching against the query
    pub cacheable: bool,
    /// Reply was served from the session's response cache
    pub from_cache: bool,
}

impl TurnOutcome {
    pub fn new(response: impl Into<String>, intent: Intent) -> Self {
        Self {
            response: response.into(),
            intent,
            is_goodbye: false,
            cacheable: false,
            from_cache: false,
        }
    }

    pub fn goodbye(mut self) -> Self {
        self.is_goodbye = true;
        self
    }

    pub fn cacheable(mut self) -> Self {
        self.cacheable = true;
        self
    }

    pub fn from_cache(mut self) -> Self {
        self.from_cache = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_builder() {
        let outcome = TurnOutcome::new("Answer text", Intent::Query).cacheable();
        assert!(outcome.cacheable);
        assert!(!outcome.is_goodbye);
        assert!(!outcome.from_cache);

        let bye = TurnOutcome::new("Bye!", Intent::Goodbye).goodbye();
        assert!(bye.is_goodbye);
    }
}
