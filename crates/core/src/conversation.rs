//! Conversation types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Bot,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "bot" | "assistant" => Self::Bot,
            _ => Self::User,
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single conversation turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Bot, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        assert_eq!(TurnRole::parse("user"), TurnRole::User);
        assert_eq!(TurnRole::parse("bot"), TurnRole::Bot);
        assert_eq!(TurnRole::parse("assistant"), TurnRole::Bot);
        assert_eq!(TurnRole::Bot.as_str(), "bot");
    }

    #[test]
    fn test_turn_constructors() {
        let turn = Turn::user("hello");
        assert_eq!(turn.role, TurnRole::User);
        assert_eq!(turn.content, "hello");
    }
}
