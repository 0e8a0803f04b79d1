//! Closed intent vocabulary

use serde::{Deserialize, Serialize};

/// Conversational intent of a user message
///
/// The set is closed on purpose: every handler matches exhaustively, so a
/// new category is a compile-time change, not a stringly-typed surprise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    CasualChat,
    Followup,
    ContactRequest,
    Query,
    Goodbye,
    Unclear,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::CasualChat => "casual_chat",
            Self::Followup => "followup",
            Self::ContactRequest => "contact_request",
            Self::Query => "query",
            Self::Goodbye => "goodbye",
            Self::Unclear => "unclear",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(Intent::CasualChat.as_str(), "casual_chat");
        assert_eq!(Intent::ContactRequest.to_string(), "contact_request");
        let json = serde_json::to_string(&Intent::Goodbye).unwrap();
        assert_eq!(json, "\"goodbye\"");
    }
}
