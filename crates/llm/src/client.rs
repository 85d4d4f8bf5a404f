//! Classifier client trait and its request/response types.

use async_trait::async_trait;
use komando_common::{IntentArgument, KomandoError, Result};
use serde::{Deserialize, Serialize};

/// Speaker of a classifier history entry. The wire knows only these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: HistoryRole,
    pub text: String,
}

impl HistoryEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: HistoryRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: HistoryRole::Model,
            text: text.into(),
        }
    }
}

/// A named intent schema offered to the classifier.
///
/// `parameters` is a JSON-schema object; provider clients adapt it to their
/// own declaration format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierRequest {
    pub system_instruction: Option<String>,
    /// Ordered conversation, ending with the utterance being classified.
    pub history: Vec<HistoryEntry>,
    pub tools: Vec<ToolDeclaration>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: IntentArgument,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierResponse {
    /// First non-empty text part, if any.
    pub text: Option<String>,
    /// Function calls in the order the model emitted them.
    pub function_calls: Vec<FunctionCall>,
}

#[async_trait]
pub trait ClassifierClient: Send + Sync {
    async fn complete(&self, request: ClassifierRequest) -> Result<ClassifierResponse>;
    fn model_name(&self) -> &str;
}

#[async_trait]
impl ClassifierClient for Box<dyn ClassifierClient> {
    async fn complete(&self, request: ClassifierRequest) -> Result<ClassifierResponse> {
        (**self).complete(request).await
    }
    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Stand-in used when no working client could be built.
///
/// Every call fails at the classifier boundary with the original
/// configuration problem, so a missing credential degrades the first
/// submission instead of the process.
pub struct UnconfiguredClassifier {
    reason: String,
}

impl UnconfiguredClassifier {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[async_trait]
impl ClassifierClient for UnconfiguredClassifier {
    async fn complete(&self, _request: ClassifierRequest) -> Result<ClassifierResponse> {
        Err(KomandoError::Classifier(format!(
            "classifier is not configured: {}",
            self.reason
        )))
    }

    fn model_name(&self) -> &str {
        "unconfigured"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&HistoryRole::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&HistoryRole::Model).unwrap(), "\"model\"");
    }

    #[test]
    fn function_call_args_default_to_empty() {
        let call: FunctionCall = serde_json::from_str(r#"{"name": "panggil_sub_agen_penjadwal"}"#).unwrap();
        assert_eq!(call.name, "panggil_sub_agen_penjadwal");
        assert!(call.args.is_empty());
    }

    #[tokio::test]
    async fn unconfigured_classifier_fails_on_use() {
        let client = UnconfiguredClassifier::new("GEMINI_API_KEY is not set");
        let err = client.complete(ClassifierRequest::default()).await.unwrap_err();
        assert!(matches!(err, KomandoError::Classifier(_)));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
        assert_eq!(client.model_name(), "unconfigured");
    }
}
