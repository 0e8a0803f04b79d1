//! Conversation orchestration
//!
//! Turns a user message into a reply: intent classification, the
//! knowledge-grounded answer path, the contact-form flow, and the
//! response polish that sits on top of raw model output.

pub mod agent;
pub mod contact_form;
pub mod intent;
pub mod prompts;
pub mod response;
pub mod validators;

pub use agent::SupportAgent;
pub use contact_form::{advance, FormStep};
pub use intent::IntentClassifier;
pub use prompts::CannedText;
