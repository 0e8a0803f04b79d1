//! Response post-processing
//!
//! Raw model answers get a polish pass: drop leading pleasantries, fall
//! back when the answer is too thin to help, and invite a followup when
//! the answer is long.

use rand::seq::SliceRandom;

use crate::prompts::{self, CannedText, FOLLOWUP_ENGAGEMENT, GREETING_PREFIXES, QUERY_ENGAGEMENT};

/// Which engagement prompt pool applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKind {
    Query,
    Followup,
}

/// Remove leading greeting phrases the model likes to open with
pub fn strip_greeting_prefix(answer: &str) -> String {
    let mut result = answer.trim();
    let mut stripped = true;
    while stripped {
        stripped = false;
        for prefix in GREETING_PREFIXES {
            // get() rather than slicing: the answer may open mid-codepoint
            match result.get(..prefix.len()) {
                Some(head) if head.eq_ignore_ascii_case(prefix) => {
                    result = result[prefix.len()..].trim_start();
                    stripped = true;
                }
                _ => {}
            }
        }
    }
    result.to_string()
}

/// Polish a model answer for delivery
pub fn polish(
    answer: &str,
    kind: AnswerKind,
    text: &CannedText,
    min_len: usize,
    engagement_threshold: usize,
) -> String {
    let cleaned = strip_greeting_prefix(answer);

    if cleaned.len() < min_len {
        return text.thin_answer_fallback();
    }

    if cleaned.len() > engagement_threshold {
        let pool = match kind {
            AnswerKind::Query => QUERY_ENGAGEMENT,
            AnswerKind::Followup => FOLLOWUP_ENGAGEMENT,
        };
        if let Some(prompt) = pool.choose(&mut rand::thread_rng()) {
            return format!("{cleaned}\n\n{prompt}");
        }
    }

    cleaned
}

/// Lead-in for a cache hit, referencing the earlier phrasing
pub fn cache_acknowledgment(original_query: &str) -> String {
    let preview = prompts::preview(original_query, 60);
    let template = prompts::CACHE_ACKNOWLEDGMENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("You asked about \"{query}\" earlier. ");
    template.replace("{query}", &preview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use support_agent_config::AgentSettings;

    fn text() -> CannedText {
        CannedText::new(&AgentSettings::default())
    }

    #[test]
    fn test_strip_single_and_stacked_prefixes() {
        assert_eq!(
            strip_greeting_prefix("Hi there! Refunds take five days."),
            "Refunds take five days."
        );
        assert_eq!(
            strip_greeting_prefix("Hello! Hi there! The answer."),
            "The answer."
        );
        assert_eq!(strip_greeting_prefix("No greeting here."), "No greeting here.");
    }

    #[test]
    fn test_strip_is_case_insensitive() {
        assert_eq!(strip_greeting_prefix("hi there! Answer."), "Answer.");
    }

    #[test]
    fn test_thin_answers_replaced() {
        let result = polish("Yes.", AnswerKind::Query, &text(), 20, 100);
        assert!(result.contains("couldn't find a good answer"));
    }

    #[test]
    fn test_long_answers_get_engagement_prompt() {
        let answer = "A".repeat(150);
        let result = polish(&answer, AnswerKind::Query, &text(), 20, 100);
        assert!(result.len() > 150);
        assert!(QUERY_ENGAGEMENT.iter().any(|p| result.ends_with(p)));

        let followup = polish(&answer, AnswerKind::Followup, &text(), 20, 100);
        assert!(FOLLOWUP_ENGAGEMENT.iter().any(|p| followup.ends_with(p)));
    }

    #[test]
    fn test_medium_answers_untouched() {
        let answer = "Refunds are processed within five business days.";
        assert_eq!(
            polish(answer, AnswerKind::Query, &text(), 20, 100),
            answer
        );
    }

    #[test]
    fn test_cache_acknowledgment_embeds_preview() {
        let ack = cache_acknowledgment("what is your refund policy");
        assert!(ack.contains("what is your refund policy"));

        let long_query = "q".repeat(90);
        let ack = cache_acknowledgment(&long_query);
        assert!(ack.contains("..."));
    }
}
