//! Central coordinator for the hospital command center.
//!
//! The coordinator is the single dispatcher that:
//! 1. Accepts a user utterance (one at a time per conversation)
//! 2. Asks the external classifier which delegate intent it expresses
//! 3. Routes the intent to a delegate category
//! 4. Runs the chosen sub-agent and appends its answer to the transcript
//!
//! # Architecture
//!
//! ```text
//! User utterance
//!      │
//!      ▼
//! ┌─────────────────┐     classify      ┌──────────────────┐
//! │   Coordinator   │ ────────────────► │ IntentClassifier │ ──► LLM
//! │  (this crate)   │                   └──────────────────┘
//! └────────┬────────┘
//!          │ route + execute
//!    ┌─────┴──────┬──────────────┬──────────────┐
//!    ▼            ▼              ▼              ▼
//! [Records] [Appointments]  [Patients]     [Billing]
//! ```

pub mod classifier;
pub mod config;
pub mod conversation;
pub mod coordinator;
pub mod prompt;
pub mod routing;

pub use classifier::{Classification, IntentClassifier};
pub use config::CoordinatorConfig;
pub use conversation::{
    Conversation, ConversationSnapshot, DispatchPhase, FAILURE_MESSAGE, Step, delegation_notice,
};
pub use coordinator::{ConversationEvent, Coordinator, DelegateExecutor, SubmitOutcome};
pub use routing::{IntentKind, RouteDecision, route};
