//! The conversation state machine.
//!
//! ```text
//!            begin(utterance)
//!   Idle ───────────────────────► AwaitingClassification
//!    ▲                                   │
//!    │  reply / nothing / fail           │ apply_classification (≥1 intent)
//!    ├───────────────────────────────────┤
//!    │                                   ▼
//!    └──────────────────────── AwaitingDelegateResponse
//!       complete_delegation / fail
//! ```
//!
//! Every transition is synchronous; the suspension points (classifier and
//! executor calls) live in [`Coordinator`](crate::Coordinator), between
//! transitions.

use komando_common::{DelegateCategory, DelegationResult, Intent, KomandoError, Result, Turn};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classifier::Classification;
use crate::routing::RouteDecision;

pub const DEFAULT_WELCOME_MESSAGE: &str = "Selamat datang di Pusat Komando Layanan Rumah Sakit. \
     Saya adalah Koordinator Pusat. Silakan sampaikan kebutuhan Anda, dan saya akan \
     mendelegasikan ke agen spesialis yang tepat.";

pub const FAILURE_MESSAGE: &str =
    "Terjadi kesalahan sistem. Mohon periksa koneksi atau API Key Anda.";

/// Text of the notice announcing a delegation to `display_name`.
pub fn delegation_notice(display_name: &str) -> String {
    format!("Mendelegasikan tugas ke {display_name}...")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DispatchPhase {
    Idle,
    AwaitingClassification,
    AwaitingDelegateResponse { category: DelegateCategory },
}

/// What the driver must do after a classification was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Invoke the executor for `category` with the intent's argument.
    Delegate {
        category: DelegateCategory,
        intent: Intent,
    },
    /// The pipeline is over; the conversation is idle again.
    Finished,
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    pub turns: Vec<Turn>,
    pub busy: bool,
    pub active_category: DelegateCategory,
    pub phase: DispatchPhase,
}

/// Transcript plus dispatch state for a single session.
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<Turn>,
    busy: bool,
    active_category: DelegateCategory,
    phase: DispatchPhase,
    welcome_message: String,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(DEFAULT_WELCOME_MESSAGE)
    }
}

impl Conversation {
    /// Start a session seeded with a welcome turn from the coordinator.
    pub fn new(welcome_message: impl Into<String>) -> Self {
        let welcome_message = welcome_message.into();
        Self {
            turns: vec![Turn::agent(DelegateCategory::Coordinator, &welcome_message)],
            busy: false,
            active_category: DelegateCategory::Coordinator,
            phase: DispatchPhase::Idle,
            welcome_message,
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn active_category(&self) -> DelegateCategory {
        self.active_category
    }

    pub fn phase(&self) -> DispatchPhase {
        self.phase
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            turns: self.turns.clone(),
            busy: self.busy,
            active_category: self.active_category,
            phase: self.phase,
        }
    }

    /// Accept a submission: append the user turn and mark the session busy.
    ///
    /// Returns the turns that preceded the utterance, for classification.
    /// Check and set of the busy flag happen in this one call.
    pub fn begin(&mut self, utterance: &str) -> Result<Vec<Turn>> {
        if self.busy {
            warn!("Submission rejected, a request is already in flight");
            return Err(KomandoError::Busy);
        }
        if utterance.trim().is_empty() {
            return Err(KomandoError::EmptyUtterance);
        }

        let prior = self.turns.clone();
        self.turns.push(Turn::user(utterance));
        self.busy = true;
        self.active_category = DelegateCategory::Coordinator;
        self.phase = DispatchPhase::AwaitingClassification;
        debug!(turns = self.turns.len(), "Awaiting classification");
        Ok(prior)
    }

    /// Apply the classifier's answer.
    ///
    /// Intents take priority over free text; text returned alongside an
    /// intent is discarded.
    pub fn apply_classification(&mut self, classification: Classification) -> Step {
        if self.phase != DispatchPhase::AwaitingClassification {
            warn!(phase = ?self.phase, "Classification applied outside AwaitingClassification");
        }

        let Classification { free_text, intents } = classification;

        if let Some(intent) = intents.into_iter().next() {
            let decision = RouteDecision::resolve(intent.identifier.as_str());
            if decision.is_unknown() {
                warn!(intent = %decision.identifier, "Unrecognized intent, falling back to coordinator");
            }
            info!(
                intent = %decision.identifier,
                category = %decision.category,
                "Delegating request"
            );

            self.turns.push(Turn::notice(delegation_notice(decision.display_name())));
            self.active_category = decision.category;
            self.phase = DispatchPhase::AwaitingDelegateResponse {
                category: decision.category,
            };
            return Step::Delegate {
                category: decision.category,
                intent,
            };
        }

        if let Some(text) = free_text {
            self.turns.push(Turn::agent(DelegateCategory::Coordinator, text));
        } else {
            debug!("Classifier returned neither intents nor text");
        }
        self.finish();
        Step::Finished
    }

    /// Append the delegate's response and return to idle.
    pub fn complete_delegation(&mut self, result: DelegationResult) {
        if !matches!(self.phase, DispatchPhase::AwaitingDelegateResponse { .. }) {
            warn!(phase = ?self.phase, "Delegation completed outside AwaitingDelegateResponse");
        }
        info!(category = %result.category, "Delegate responded");
        self.turns.push(Turn::agent(result.category, result.text));
        self.finish();
    }

    /// Record a failure and return to idle.
    ///
    /// `active_category` keeps whoever was engaged when the failure happened.
    pub fn fail(&mut self, message: impl Into<String>) {
        warn!(phase = ?self.phase, active = %self.active_category, "Pipeline failed");
        self.turns.push(Turn::notice(message));
        self.finish();
    }

    /// Drop the transcript back to the welcome turn. Rejected while busy.
    pub fn reset(&mut self) -> Result<()> {
        if self.busy {
            return Err(KomandoError::Busy);
        }
        *self = Self::new(std::mem::take(&mut self.welcome_message));
        Ok(())
    }

    fn finish(&mut self) {
        self.busy = false;
        self.phase = DispatchPhase::Idle;
    }
}
