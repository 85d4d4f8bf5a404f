//! The coordinator: drives classify → route → execute for one conversation.

use std::sync::Arc;

use async_trait::async_trait;
use komando_agents::SubAgentExecutor;
use komando_common::{
    DelegateCategory, DelegationResult, IntentArgument, KomandoError, Result, Turn,
};
use komando_llm::{ClassifierClient, UnconfiguredClassifier, build_classifier_client};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::classifier::IntentClassifier;
use crate::config::CoordinatorConfig;
use crate::conversation::{Conversation, ConversationSnapshot, FAILURE_MESSAGE, Step};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Runs a delegated request for a category.
///
/// An `Err` is treated as an executor-boundary failure. The bundled
/// [`SubAgentExecutor`] never returns one.
#[async_trait]
pub trait DelegateExecutor: Send + Sync {
    async fn execute(
        &self,
        category: DelegateCategory,
        argument: &IntentArgument,
    ) -> Result<DelegationResult>;
}

#[async_trait]
impl DelegateExecutor for SubAgentExecutor {
    async fn execute(
        &self,
        category: DelegateCategory,
        argument: &IntentArgument,
    ) -> Result<DelegationResult> {
        Ok(SubAgentExecutor::execute(self, category, argument).await)
    }
}

/// Change notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    TurnAppended {
        turn: Turn,
    },
    StateChanged {
        busy: bool,
        active_category: DelegateCategory,
    },
    Reset,
}

/// The turns one accepted submission added to the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub appended: Vec<Turn>,
    pub active_category: DelegateCategory,
}

/// Owns the conversation and sequences the classifier and executor calls.
///
/// The conversation lock is only held for the synchronous transitions, never
/// across a classifier or executor call.
pub struct Coordinator {
    classifier: IntentClassifier,
    executor: Arc<dyn DelegateExecutor>,
    conversation: Mutex<Conversation>,
    events: broadcast::Sender<ConversationEvent>,
}

impl Coordinator {
    /// Create a coordinator from configuration.
    ///
    /// A missing credential does not fail construction: the classifier is
    /// replaced by one that reports the problem on first use.
    pub fn new(config: &CoordinatorConfig) -> Self {
        info!("Initializing Komando coordinator");

        let client: Arc<dyn ClassifierClient> = match build_classifier_client(&config.provider) {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Classifier unavailable, submissions will fail until configured");
                Arc::new(UnconfiguredClassifier::new(e.to_string()))
            }
        };
        let executor = Arc::new(SubAgentExecutor::with_default_agents(config.executor.clone()));

        Self::with_components(config, client, executor)
    }

    /// Create a coordinator around explicit classifier and executor implementations.
    pub fn with_components(
        config: &CoordinatorConfig,
        client: Arc<dyn ClassifierClient>,
        executor: Arc<dyn DelegateExecutor>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            classifier: IntentClassifier::new(client, config.provider.temperature),
            executor,
            conversation: Mutex::new(Conversation::new(config.welcome_message.clone())),
            events,
        }
    }

    pub fn classifier_model(&self) -> &str {
        self.classifier.model_name()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ConversationSnapshot {
        self.conversation.lock().await.snapshot()
    }

    pub async fn is_busy(&self) -> bool {
        self.conversation.lock().await.is_busy()
    }

    /// Clear the transcript back to the welcome turn. Rejected while busy.
    pub async fn reset(&self) -> Result<()> {
        self.conversation.lock().await.reset()?;
        info!("Conversation reset");
        let _ = self.events.send(ConversationEvent::Reset);
        Ok(())
    }

    /// Submit an utterance and wait for the pipeline to finish.
    ///
    /// Rejected with [`KomandoError::Busy`] while another submission is in
    /// flight. Once accepted the pipeline runs on its own task, so dropping
    /// this future does not abandon it.
    pub async fn submit(self: &Arc<Self>, utterance: impl Into<String>) -> Result<SubmitOutcome> {
        let handle = self.submit_detached(utterance).await?;
        handle
            .await
            .map_err(|e| KomandoError::Executor(format!("dispatch task failed: {e}")))
    }

    /// Accept an utterance and run its pipeline in the background.
    pub async fn submit_detached(
        self: &Arc<Self>,
        utterance: impl Into<String>,
    ) -> Result<JoinHandle<SubmitOutcome>> {
        let utterance = utterance.into();
        let (prior, mut appended) = self
            .transition(|conversation| conversation.begin(&utterance))
            .await;
        let prior = prior?;

        info!(
            utterance_preview = %utterance.chars().take(50).collect::<String>(),
            "Submission accepted"
        );

        let coordinator = Arc::clone(self);
        Ok(tokio::spawn(async move {
            appended.extend(coordinator.run_pipeline(&utterance, &prior).await);
            let active_category = coordinator.conversation.lock().await.active_category();
            SubmitOutcome {
                appended,
                active_category,
            }
        }))
    }

    /// Classify, route and execute. Returns the turns appended after the user turn.
    async fn run_pipeline(&self, utterance: &str, prior: &[Turn]) -> Vec<Turn> {
        let classification = match self.classifier.classify(utterance, prior).await {
            Ok(classification) => classification,
            Err(e) => {
                error!(error = %e, "Classification failed");
                let ((), appended) = self.transition(|c| c.fail(FAILURE_MESSAGE)).await;
                return appended;
            }
        };

        let (step, mut appended) = self
            .transition(|c| c.apply_classification(classification))
            .await;

        if let Step::Delegate { category, intent } = step {
            let ((), tail) = match self.executor.execute(category, &intent.argument).await {
                Ok(result) => self.transition(|c| c.complete_delegation(result)).await,
                Err(e) => {
                    error!(error = %e, %category, "Delegate execution failed");
                    self.transition(|c| c.fail(FAILURE_MESSAGE)).await
                }
            };
            appended.extend(tail);
        }

        appended
    }

    /// Apply one synchronous transition and publish what changed.
    async fn transition<R>(&self, apply: impl FnOnce(&mut Conversation) -> R) -> (R, Vec<Turn>) {
        let (result, appended, state_before, state_after) = {
            let mut conversation = self.conversation.lock().await;
            let len_before = conversation.turns().len();
            let state_before = (conversation.is_busy(), conversation.active_category());
            let result = apply(&mut conversation);
            let appended = conversation.turns()[len_before..].to_vec();
            let state_after = (conversation.is_busy(), conversation.active_category());
            (result, appended, state_before, state_after)
        };

        for turn in &appended {
            let _ = self.events.send(ConversationEvent::TurnAppended { turn: turn.clone() });
        }
        if state_before != state_after {
            let _ = self.events.send(ConversationEvent::StateChanged {
                busy: state_after.0,
                active_category: state_after.1,
            });
        }

        (result, appended)
    }
}
