//! Contact-form state machine
//!
//! `advance` is a pure step function: state x input x accumulated data in,
//! reply plus next state plus data out. Persistence of the completed
//! request is the orchestrator's job, so every transition here is unit
//! testable without IO.
//!
//! Invalid input never advances the machine: the same field is re-asked
//! with the validator's correction message.

use support_agent_core::{ContactFormData, ContactFormState};

use crate::prompts::CannedText;
use crate::validators;

/// Affirmative consent answers, compared after trim/lowercase/punctuation
/// strip. Anything else is a decline.
const AFFIRMATIVES: &[&str] = &["yes", "y", "sure", "ok", "okay", "yeah"];

/// Outcome of one form turn
#[derive(Debug, Clone)]
pub struct FormStep {
    pub reply: String,
    pub next_state: ContactFormState,
    pub data: ContactFormData,
    /// The request is complete and ready to persist
    pub completed: bool,
}

impl FormStep {
    fn stay(state: ContactFormState, data: ContactFormData, reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            next_state: state,
            data,
            completed: false,
        }
    }

    fn advance_to(
        state: ContactFormState,
        data: ContactFormData,
        reply: impl Into<String>,
    ) -> Self {
        Self::stay(state, data, reply)
    }
}

fn is_affirmative(input: &str) -> bool {
    let normalized: String = input
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    AFFIRMATIVES.contains(&normalized.as_str())
}

/// Run one step of the form. `state` must be an active state; `Idle` and
/// `Completed` fall through to a safe reset.
pub fn advance(
    state: ContactFormState,
    input: &str,
    mut data: ContactFormData,
    text: &CannedText,
) -> FormStep {
    use ContactFormState as S;

    match state {
        S::AskingConsent => {
            if is_affirmative(input) {
                if data.has_contact_fields() {
                    let name = data.name.clone().unwrap_or_default();
                    FormStep::advance_to(S::CollectingDatetime, data, text.ask_datetime_reentry(&name))
                } else {
                    FormStep::advance_to(S::CollectingName, data, text.ask_name())
                }
            } else {
                // declining wipes anything gathered for this request
                data.clear();
                FormStep::advance_to(S::Idle, data, text.consent_declined())
            }
        }

        S::CollectingName => match validators::validate_name(input) {
            Ok(name) => {
                let reply = text.ask_email(&name);
                data.name = Some(name);
                FormStep::advance_to(S::CollectingEmail, data, reply)
            }
            Err(message) => FormStep::stay(state, data, message),
        },

        S::CollectingEmail => match validators::validate_email(input) {
            Ok(email) => {
                data.email = Some(email);
                FormStep::advance_to(S::CollectingPhone, data, text.ask_phone())
            }
            Err(message) => FormStep::stay(state, data, message),
        },

        S::CollectingPhone => match validators::validate_phone(input) {
            Ok(phone) => {
                data.mobile = Some(phone);
                FormStep::advance_to(S::CollectingDatetime, data, text.ask_datetime())
            }
            Err(message) => FormStep::stay(state, data, message),
        },

        S::CollectingDatetime => match validators::validate_datetime(input) {
            Ok(datetime) => {
                data.preferred_datetime = Some(datetime);
                FormStep::advance_to(S::CollectingTimezone, data, text.ask_timezone())
            }
            Err(message) => FormStep::stay(state, data, message),
        },

        S::CollectingTimezone => match validators::validate_timezone(input) {
            Ok(timezone) => {
                data.timezone = Some(timezone);
                let datetime = data.preferred_datetime.clone().unwrap_or_default();
                let tz = data.timezone.clone().unwrap_or_default();
                FormStep {
                    reply: text.form_completed(&datetime, &tz),
                    next_state: S::Completed,
                    data,
                    completed: true,
                }
            }
            Err(message) => FormStep::stay(state, data, message),
        },

        S::InitialCollectingName => match validators::validate_name(input) {
            Ok(name) => {
                let reply = text.ask_email(&name);
                data.name = Some(name);
                FormStep::advance_to(S::InitialCollectingEmail, data, reply)
            }
            Err(message) => FormStep::stay(state, data, message),
        },

        S::InitialCollectingEmail => match validators::validate_email(input) {
            Ok(email) => {
                data.email = Some(email);
                FormStep::advance_to(S::InitialCollectingPhone, data, text.ask_phone())
            }
            Err(message) => FormStep::stay(state, data, message),
        },

        // details are kept for later contact-request re-entry
        S::InitialCollectingPhone => match validators::validate_phone(input) {
            Ok(phone) => {
                data.mobile = Some(phone);
                FormStep::advance_to(S::Idle, data, text.initial_done())
            }
            Err(message) => FormStep::stay(state, data, message),
        },

        S::Idle | S::Completed => {
            tracing::warn!(state = %state, "Form step called outside an active state");
            FormStep::advance_to(S::Idle, data, text.consent_declined())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use support_agent_config::AgentSettings;
    use support_agent_core::ContactFormState as S;

    fn text() -> CannedText {
        CannedText::new(&AgentSettings::default())
    }

    fn step(state: S, input: &str, data: ContactFormData) -> FormStep {
        advance(state, input, data, &text())
    }

    #[test]
    fn test_consent_yes_starts_collection() {
        for yes in ["yes", "Y", " Sure ", "ok", "Okay!", "yeah"] {
            let result = step(S::AskingConsent, yes, ContactFormData::default());
            assert_eq!(result.next_state, S::CollectingName, "input: {yes}");
        }
    }

    #[test]
    fn test_consent_decline_clears_data() {
        let data = ContactFormData {
            original_query: Some("enterprise pricing".into()),
            ..Default::default()
        };
        let result = step(S::AskingConsent, "no thanks", data);
        assert_eq!(result.next_state, S::Idle);
        assert!(result.data.is_empty());
        assert!(!result.completed);
    }

    #[test]
    fn test_consent_yes_with_details_skips_to_datetime() {
        let data = ContactFormData {
            name: Some("Priya".into()),
            email: Some("priya@example.com".into()),
            mobile: Some("+919876543210".into()),
            ..Default::default()
        };
        let result = step(S::AskingConsent, "yes", data);
        assert_eq!(result.next_state, S::CollectingDatetime);
        assert!(result.reply.contains("Priya"));
    }

    #[test]
    fn test_invalid_input_never_advances() {
        let cases: Vec<(S, &str)> = vec![
            (S::CollectingName, ""),
            (S::CollectingName, "A"),
            (S::CollectingEmail, "not-an-email"),
            (S::CollectingPhone, "12345"),
            (S::CollectingDatetime, "now"),
            (S::CollectingTimezone, "x"),
            (S::InitialCollectingName, " "),
            (S::InitialCollectingEmail, "a@b"),
            (S::InitialCollectingPhone, "no digits"),
        ];
        for (state, input) in cases {
            let result = step(state, input, ContactFormData::default());
            assert_eq!(result.next_state, state, "state {state} advanced on {input:?}");
            assert!(!result.completed);
            assert!(!result.reply.is_empty());
        }
    }

    #[test]
    fn test_happy_path_terminates_in_five_steps() {
        let text = text();
        let mut state = S::CollectingName;
        let mut data = ContactFormData::default();
        let inputs = [
            "Priya Sharma",
            "priya@example.com",
            "+91 98765 43210",
            "Tomorrow 3pm",
            "IST",
        ];

        let mut last = None;
        for input in inputs {
            let result = advance(state, input, data, &text);
            state = result.next_state;
            data = result.data.clone();
            last = Some(result);
        }

        let last = last.unwrap();
        assert_eq!(state, S::Completed);
        assert!(last.completed);
        assert_eq!(last.data.name.as_deref(), Some("Priya Sharma"));
        assert_eq!(last.data.mobile.as_deref(), Some("+919876543210"));
        assert!(last.reply.contains("Tomorrow 3pm"));
        assert!(last.reply.contains("IST"));
    }

    #[test]
    fn test_initial_collection_retains_data_and_goes_idle() {
        let text = text();
        let mut state = S::InitialCollectingName;
        let mut data = ContactFormData::default();

        for input in ["Priya", "priya@example.com", "+919876543210"] {
            let result = advance(state, input, data, &text);
            state = result.next_state;
            data = result.data;
        }

        assert_eq!(state, S::Idle);
        assert!(data.has_contact_fields());
    }

    #[test]
    fn test_phone_is_stored_normalized() {
        let result = step(S::CollectingPhone, "+1 (415) 555-0100", ContactFormData::default());
        assert_eq!(result.data.mobile.as_deref(), Some("+14155550100"));
        assert_eq!(result.next_state, S::CollectingDatetime);
    }
}
