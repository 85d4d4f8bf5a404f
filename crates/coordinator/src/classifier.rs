//! Intent classification over the external language model.

use std::sync::Arc;

use komando_common::{Intent, Result, Role, Turn};
use komando_llm::{ClassifierClient, ClassifierRequest, HistoryEntry, ToolDeclaration};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::prompt::{COORDINATOR_SYSTEM_INSTRUCTION, intent_tools};

/// What the classifier made of one utterance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Plain conversational reply, if any.
    pub free_text: Option<String>,
    /// Delegation intents in emission order. Only the first is acted upon.
    pub intents: Vec<Intent>,
}

impl Classification {
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            free_text: Some(text.into()),
            intents: Vec::new(),
        }
    }

    pub fn delegate(intent: Intent) -> Self {
        Self {
            free_text: None,
            intents: vec![intent],
        }
    }

    pub fn primary_intent(&self) -> Option<&Intent> {
        self.intents.first()
    }
}

/// Classifies user utterances into delegation intents.
pub struct IntentClassifier {
    client: Arc<dyn ClassifierClient>,
    system_instruction: String,
    tools: Vec<ToolDeclaration>,
    temperature: f32,
}

impl IntentClassifier {
    pub fn new(client: Arc<dyn ClassifierClient>, temperature: f32) -> Self {
        Self {
            client,
            system_instruction: COORDINATOR_SYSTEM_INSTRUCTION.to_string(),
            tools: intent_tools(),
            temperature,
        }
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Classify `utterance` given the turns that preceded it.
    ///
    /// Notices (delegations and failures) never reach the model.
    pub async fn classify(&self, utterance: &str, prior_turns: &[Turn]) -> Result<Classification> {
        let request = self.build_request(utterance, prior_turns);
        info!(
            model = %self.client.model_name(),
            history_len = request.history.len(),
            "Classifying utterance"
        );

        let response = self.client.complete(request).await?;

        let intents: Vec<Intent> = response
            .function_calls
            .into_iter()
            .map(|call| Intent::new(call.name, call.args))
            .collect();

        if intents.len() > 1 {
            warn!(
                count = intents.len(),
                "Classifier returned several intents, only the first is honored"
            );
        }

        let classification = Classification {
            free_text: response.text.filter(|t| !t.trim().is_empty()),
            intents,
        };
        debug!(
            intents = ?classification.intents.iter().map(|i| &i.identifier).collect::<Vec<_>>(),
            has_text = classification.free_text.is_some(),
            "Classification received"
        );
        Ok(classification)
    }

    fn build_request(&self, utterance: &str, prior_turns: &[Turn]) -> ClassifierRequest {
        let mut history: Vec<HistoryEntry> = prior_turns.iter().filter_map(history_entry).collect();
        history.push(HistoryEntry::user(utterance));

        ClassifierRequest {
            system_instruction: Some(self.system_instruction.clone()),
            history,
            tools: self.tools.clone(),
            temperature: Some(self.temperature),
            max_tokens: None,
        }
    }
}

fn history_entry(turn: &Turn) -> Option<HistoryEntry> {
    if turn.is_notice {
        return None;
    }
    match turn.speaker {
        Role::User => Some(HistoryEntry::user(&turn.text)),
        Role::Agent => Some(HistoryEntry::model(&turn.text)),
        Role::System => None,
    }
}
