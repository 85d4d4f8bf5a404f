//! Conversation turns, classifier intents and delegation results.

use crate::category::DelegateCategory;
use serde::{Deserialize, Serialize};

/// Name of the single required field every intent schema declares. It carries
/// the user's original utterance verbatim.
pub const REQUEST_FIELD: &str = "permintaan_pengguna";

/// Structured arguments attached to an intent, keyed by field name.
pub type IntentArgument = serde_json::Map<String, serde_json::Value>;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
    System,
}

/// A single immutable entry in the conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Unique turn ID
    pub id: String,

    /// Role of the speaker
    pub speaker: Role,

    /// Category that produced the turn. Only set for agent turns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<DelegateCategory>,

    /// Turn text (markdown-flavoured for agent turns)
    pub text: String,

    /// Timestamp (Unix millis)
    pub created_at: u64,

    /// System announcement (delegation or failure). Never sent to the classifier.
    #[serde(default)]
    pub is_notice: bool,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self::build(Role::User, None, text.into(), false)
    }

    pub fn agent(category: DelegateCategory, text: impl Into<String>) -> Self {
        Self::build(Role::Agent, Some(category), text.into(), false)
    }

    /// A system announcement: a delegation or a pipeline failure.
    pub fn notice(text: impl Into<String>) -> Self {
        Self::build(Role::System, None, text.into(), true)
    }

    fn build(speaker: Role, category: Option<DelegateCategory>, text: String, is_notice: bool) -> Self {
        Self {
            id: format!("turn_{}", uuid::Uuid::new_v4()),
            speaker,
            category,
            text,
            created_at: now_millis(),
            is_notice,
        }
    }
}

/// A named request for delegation, as produced by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub identifier: String,
    #[serde(default)]
    pub argument: IntentArgument,
}

impl Intent {
    pub fn new(identifier: impl Into<String>, argument: IntentArgument) -> Self {
        Self {
            identifier: identifier.into(),
            argument,
        }
    }

    /// Build an intent whose argument carries `request` in [`REQUEST_FIELD`].
    pub fn with_request(identifier: impl Into<String>, request: impl Into<String>) -> Self {
        let mut argument = IntentArgument::new();
        argument.insert(
            REQUEST_FIELD.to_string(),
            serde_json::Value::String(request.into()),
        );
        Self::new(identifier, argument)
    }

    /// The forwarded user request, if the classifier supplied one as a string.
    pub fn request_text(&self) -> Option<&str> {
        request_text(&self.argument)
    }
}

/// Read the primary text field out of an intent argument.
pub fn request_text(argument: &IntentArgument) -> Option<&str> {
    argument.get(REQUEST_FIELD).and_then(|v| v.as_str())
}

/// Output of a sub-agent, owned by the producing call until it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationResult {
    pub category: DelegateCategory,
    pub text: String,
}

impl DelegationResult {
    pub fn new(category: DelegateCategory, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
        }
    }
}

fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
