//! Prompt builders and canned reply text
//!
//! Everything user-visible that is not model output lives here, built
//! once from the agent settings so the persona and contact email stay
//! consistent across handlers.

use support_agent_config::AgentSettings;
use support_agent_core::ScoredPassage;

/// Leading pleasantries stripped from model answers so replies get to
/// the point.
pub const GREETING_PREFIXES: &[&str] = &[
    "Hi there!",
    "Hello there!",
    "Hey there!",
    "Hello!",
    "Hi!",
    "Hey!",
    "Good morning!",
    "Good afternoon!",
    "Good evening!",
    "Greetings!",
];

/// Appended to long query answers to keep the conversation going
pub const QUERY_ENGAGEMENT: &[&str] = &[
    "Would you like to know more about any part of this?",
    "Is there anything specific here you'd like me to explain further?",
    "Do you have any other questions about this?",
    "Let me know if you'd like more detail on anything!",
];

/// Appended to long followup answers
pub const FOLLOWUP_ENGAGEMENT: &[&str] = &[
    "I hope that gives you a clearer picture!",
    "Does that answer your question?",
    "Is there anything else you'd like to explore?",
    "Happy to dig deeper if you'd like!",
];

/// Lead-ins for replies served from the session cache; `{query}` is the
/// truncated earlier phrasing.
pub const CACHE_ACKNOWLEDGMENTS: &[&str] = &[
    "You asked about \"{query}\" earlier. ",
    "We touched on \"{query}\" a moment ago. ",
    "As I mentioned when you asked \"{query}\": ",
    "Circling back to \"{query}\": ",
];

/// Canned replies, rendered once from settings
#[derive(Debug, Clone)]
pub struct CannedText {
    pub assistant_name: String,
    pub company_name: String,
    pub contact_email: String,
    pub knowledge_domain: String,
}

impl CannedText {
    pub fn new(settings: &AgentSettings) -> Self {
        Self {
            assistant_name: settings.assistant_name.clone(),
            company_name: settings.company_name.clone(),
            contact_email: settings.contact_email.clone(),
            knowledge_domain: settings.knowledge_domain.clone(),
        }
    }

    pub fn greeting_fallback(&self) -> String {
        format!(
            "Hello! I'm {}, {}'s support assistant. How can I help you today?",
            self.assistant_name, self.company_name
        )
    }

    pub fn casual_fallback(&self) -> String {
        "I'm doing great, thanks for asking! What can I help you with?".to_string()
    }

    pub fn goodbye_fallback(&self) -> String {
        format!(
            "Thanks for chatting with {}! Feel free to come back anytime. Take care!",
            self.company_name
        )
    }

    pub fn unclear_reply(&self) -> String {
        format!(
            "I'm not quite sure what you're asking. Could you rephrase that? I can answer questions about {}.",
            self.knowledge_domain
        )
    }

    /// Outer error boundary reply; the session stays usable.
    pub fn apology(&self) -> String {
        "I'm sorry, something went wrong on my end. Please try that again in a moment.".to_string()
    }

    /// Replaces answers too short to be useful
    pub fn thin_answer_fallback(&self) -> String {
        format!(
            "I'm sorry, I couldn't find a good answer to that. Could you rephrase your question? You can also reach our team at {}.",
            self.contact_email
        )
    }

    /// Offered when a query finds nothing relevant in the collection
    pub fn consent_prompt(&self) -> String {
        "I couldn't find information about that in my knowledge base. Would you like our team to contact you directly to help with your question?".to_string()
    }

    pub fn consent_declined(&self) -> String {
        "No problem! Is there anything else I can help you with?".to_string()
    }

    /// A followup that finds nothing extra gets this, not the consent flow
    pub fn no_additional_info(&self) -> String {
        format!(
            "I don't have additional information on that topic. If you'd like, our team can help directly - you can reach us at {}.",
            self.contact_email
        )
    }

    // --- contact-form prompts ---

    pub fn ask_name(&self) -> String {
        "Great! I'll arrange for our team to contact you. What's your name?".to_string()
    }

    pub fn ask_email(&self, name: &str) -> String {
        format!("Thanks, {name}! What's your email address?")
    }

    pub fn ask_phone(&self) -> String {
        "Perfect! What's your mobile number? Please include your country code.".to_string()
    }

    pub fn ask_datetime(&self) -> String {
        "Got it! When would you prefer us to contact you? (e.g., 'Tomorrow afternoon', 'Monday 10am')".to_string()
    }

    pub fn ask_timezone(&self) -> String {
        "And what timezone are you in? (e.g., IST, UTC+5:30, EST, PST, GMT)".to_string()
    }

    pub fn form_completed(&self, datetime: &str, timezone: &str) -> String {
        format!(
            "All set! We've recorded your request and our team will contact you at {datetime} ({timezone}). Is there anything else I can help you with?"
        )
    }

    /// Re-entry with details on file skips straight to scheduling
    pub fn ask_datetime_reentry(&self, name: &str) -> String {
        format!(
            "I still have your details, {name}. When would you prefer us to contact you? (e.g., 'Tomorrow afternoon', 'Monday 10am')"
        )
    }

    // --- initial details collection ---

    pub fn initial_ask_name(&self) -> String {
        format!(
            "Hi! I'm {}, {}'s support assistant. Before we begin, may I have your name?",
            self.assistant_name, self.company_name
        )
    }

    pub fn initial_done(&self) -> String {
        "Thank you! How can I help you today?".to_string()
    }
}

// --- model prompts ---

pub fn classification_prompt(message: &str, previous_query: Option<&str>) -> String {
    let context = match previous_query {
        Some(prev) => format!("The user's previous question was: \"{prev}\"\n"),
        None => "This is the first message of the conversation.\n".to_string(),
    };
    format!(
        "Classify the intent of a customer-support message into exactly one category:\n\
         - greeting: a hello with no question\n\
         - casual_chat: small talk unrelated to support\n\
         - followup: asks for more detail about the previous answer\n\
         - contact_request: asks to talk to a person or be contacted\n\
         - query: a support question to answer from documentation\n\
         - goodbye: wrapping up or thanking to end the conversation\n\
         - unclear: none of the above\n\
         {context}\
         Message: \"{message}\"\n\
         Reply with only the category name."
    )
}

pub fn greeting_prompt(text: &CannedText) -> String {
    format!(
        "You are {}, a friendly support assistant for {}. The user just greeted you. \
         Reply with a short, warm greeting (one or two sentences) and offer to help with {}.",
        text.assistant_name, text.company_name, text.knowledge_domain
    )
}

pub fn casual_prompt(text: &CannedText, message: &str) -> String {
    format!(
        "You are {}, a friendly support assistant for {}. The user is making small talk: \"{message}\". \
         Reply briefly and warmly, then gently steer back to how you can help.",
        text.assistant_name, text.company_name
    )
}

pub fn goodbye_prompt(text: &CannedText) -> String {
    format!(
        "You are {}, a support assistant for {}. The user is ending the conversation. \
         Reply with a short, warm sign-off (one sentence).",
        text.assistant_name, text.company_name
    )
}

pub fn answer_prompt(text: &CannedText, question: &str, passages: &[ScoredPassage]) -> String {
    let context = render_context(passages);
    format!(
        "You are {}, a support assistant for {}. Answer the user's question using ONLY the \
         context below. Be concise and conversational. If the context does not contain the \
         answer, say you don't have that information.\n\n\
         Context:\n{context}\n\
         Question: {question}\n\n\
         Answer:",
        text.assistant_name, text.company_name
    )
}

pub fn followup_prompt(
    text: &CannedText,
    original_query: &str,
    message: &str,
    passages: &[ScoredPassage],
) -> String {
    let context = render_context(passages);
    format!(
        "You are {}, a support assistant for {}. The user previously asked: \"{original_query}\" \
         and now wants more detail: \"{message}\". Using ONLY the context below, give additional \
         information beyond what a first answer would cover. Be concise.\n\n\
         Context:\n{context}\n\
         Answer:",
        text.assistant_name, text.company_name
    )
}

fn render_context(passages: &[ScoredPassage]) -> String {
    passages
        .iter()
        .enumerate()
        .map(|(i, p)| format!("[{}] {}", i + 1, p.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate a query for display inside acknowledgment templates
pub fn preview(query: &str, max_chars: usize) -> String {
    if query.chars().count() <= max_chars {
        query.to_string()
    } else {
        let cut: String = query.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use support_agent_config::AgentSettings;

    #[test]
    fn test_canned_text_uses_settings() {
        let text = CannedText::new(&AgentSettings {
            assistant_name: "Asha".into(),
            company_name: "Acme".into(),
            contact_email: "help@acme.test".into(),
            ..Default::default()
        });
        assert!(text.greeting_fallback().contains("Asha"));
        assert!(text.thin_answer_fallback().contains("help@acme.test"));
        assert!(text.no_additional_info().contains("help@acme.test"));
    }

    #[test]
    fn test_preview_truncation() {
        assert_eq!(preview("short", 60), "short");
        let long = "x".repeat(80);
        let cut = preview(&long, 60);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 63);
    }

    #[test]
    fn test_answer_prompt_numbers_context() {
        let text = CannedText::new(&AgentSettings::default());
        let passages = vec![
            ScoredPassage::new("first passage", 0.1),
            ScoredPassage::new("second passage", 0.2),
        ];
        let prompt = answer_prompt(&text, "what is this", &passages);
        assert!(prompt.contains("[1] first passage"));
        assert!(prompt.contains("[2] second passage"));
    }
}
