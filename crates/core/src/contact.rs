//! Contact-form state machine types and persisted contact requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Contact-form collection state
///
/// `InitialCollecting*` states belong to the optional up-front details
/// collection that runs when a session starts; `Collecting*` states belong
/// to the contact-request flow proper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactFormState {
    Idle,
    InitialCollectingName,
    InitialCollectingEmail,
    InitialCollectingPhone,
    AskingConsent,
    CollectingName,
    CollectingEmail,
    CollectingPhone,
    CollectingDatetime,
    CollectingTimezone,
    Completed,
}

impl ContactFormState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InitialCollectingName => "initial_collecting_name",
            Self::InitialCollectingEmail => "initial_collecting_email",
            Self::InitialCollectingPhone => "initial_collecting_phone",
            Self::AskingConsent => "asking_consent",
            Self::CollectingName => "collecting_name",
            Self::CollectingEmail => "collecting_email",
            Self::CollectingPhone => "collecting_phone",
            Self::CollectingDatetime => "collecting_datetime",
            Self::CollectingTimezone => "collecting_timezone",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "initial_collecting_name" => Self::InitialCollectingName,
            "initial_collecting_email" => Self::InitialCollectingEmail,
            "initial_collecting_phone" => Self::InitialCollectingPhone,
            "asking_consent" => Self::AskingConsent,
            "collecting_name" => Self::CollectingName,
            "collecting_email" => Self::CollectingEmail,
            "collecting_phone" => Self::CollectingPhone,
            "collecting_datetime" => Self::CollectingDatetime,
            "collecting_timezone" => Self::CollectingTimezone,
            "completed" => Self::Completed,
            _ => Self::Idle,
        }
    }

    /// True while the form owns the conversation and every user message
    /// must be routed to the form flow instead of intent classification.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle | Self::Completed)
    }
}

impl Default for ContactFormState {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for ContactFormState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated contact-form answers for one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFormData {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub preferred_datetime: Option<String>,
    pub timezone: Option<String>,
    /// The query that triggered the contact flow, kept for the
    /// follow-up team.
    pub original_query: Option<String>,
}

impl ContactFormData {
    /// Name, email and mobile already collected, so a re-entering
    /// contact flow can skip straight to scheduling.
    pub fn has_contact_fields(&self) -> bool {
        self.name.is_some() && self.email.is_some() && self.mobile.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Status of a persisted contact request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    Pending,
    Contacted,
    Resolved,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Contacted => "contacted",
            Self::Resolved => "resolved",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "contacted" => Self::Contacted,
            "resolved" => Self::Resolved,
            _ => Self::Pending,
        }
    }
}

/// A completed contact request ready for the follow-up team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRequest {
    pub request_id: Uuid,
    pub session_id: String,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub preferred_datetime: String,
    pub timezone: String,
    pub original_query: Option<String>,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
}

impl ContactRequest {
    pub fn from_form(session_id: &str, data: &ContactFormData) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            session_id: session_id.to_string(),
            name: data.name.clone().unwrap_or_default(),
            email: data.email.clone().unwrap_or_default(),
            mobile: data.mobile.clone().unwrap_or_default(),
            preferred_datetime: data.preferred_datetime.clone().unwrap_or_default(),
            timezone: data.timezone.clone().unwrap_or_default(),
            original_query: data.original_query.clone(),
            status: ContactStatus::Pending,
            created_at: Utc::now(),
        }
    }
}
