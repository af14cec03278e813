use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TriageError;

/// Untrusted object decoded from the model's answer.
pub type RawModelOutput = serde_json::Map<String, Value>;

/// Ordinal urgency of a triage decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "критично срочно")]
    CriticalUrgent,
    #[serde(rename = "срочно")]
    Urgent,
    #[serde(rename = "планово")]
    Routine,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::CriticalUrgent, Priority::Urgent, Priority::Routine];

    /// Wire label, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::CriticalUrgent => "критично срочно",
            Priority::Urgent => "срочно",
            Priority::Routine => "планово",
        }
    }
}

/// Clinical department the patient should be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Therapy,
    Surgery,
    Pediatrics,
    Trauma,
    Neurology,
    Other,
}

impl Profile {
    pub const ALL: [Profile; 6] = [
        Profile::Therapy,
        Profile::Surgery,
        Profile::Pediatrics,
        Profile::Trauma,
        Profile::Neurology,
        Profile::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Therapy => "therapy",
            Profile::Surgery => "surgery",
            Profile::Pediatrics => "pediatrics",
            Profile::Trauma => "trauma",
            Profile::Neurology => "neurology",
            Profile::Other => "other",
        }
    }
}

/// Citation of a clinical protocol backing the decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub id: String,
    pub section: Option<String>,
    pub version_date: Option<String>,
}

/// Strict triage contract returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResult {
    pub priority: Priority,
    pub reason: String,
    pub hint_for_doctor: Option<String>,
    pub profile: Profile,
    pub confidence: f64,
    pub red_flags: Vec<String>,
    pub sources: Vec<SourceRef>,
}

/// Vital signs exactly as the caller sent them. Any field may be a string,
/// a number, null, or missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawVitals {
    #[serde(default)]
    pub bp: Option<Value>,
    #[serde(default)]
    pub hr: Option<Value>,
    #[serde(default)]
    pub spo2: Option<Value>,
    #[serde(default)]
    pub temp: Option<Value>,
    #[serde(default)]
    pub rr: Option<Value>,
    #[serde(default)]
    pub gcs: Option<Value>,
}

/// Inbound triage request.
#[derive(Debug, Clone, Deserialize)]
pub struct TriageInput {
    pub complaint: String,
    #[serde(default)]
    pub history: Option<String>,
    #[serde(default)]
    pub vitals: Option<RawVitals>,
}

/// One message of a completion conversation (`role` is system/user/assistant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub text: String,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self { role: "system".into(), text: text.into() }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self { role: "user".into(), text: text.into() }
    }
}

/// Request handed to a completion provider. `None` fields fall back to the
/// provider's configured defaults.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub model_uri: Option<String>,
}

/// Text answer of a completion provider plus its bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct Completion {
    pub text: String,
    pub usage: Option<Value>,
    pub model_version: Option<String>,
}

/// Completion provider abstraction (allows mocking).
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, TriageError>;

    /// Model URI used when a request does not name one.
    fn model_uri(&self) -> &str;
}
