//! The sub-agent capability.
//!
//! Defined in `komando-common` so that both the coordinator and the agent
//! crate can reference it without circular dependencies.

use crate::{DelegateCategory, DelegationResult, IntentArgument};
use async_trait::async_trait;

/// A specialist that turns a delegated request into a response.
///
/// One implementation exists per delegate category. Real subsystems (records
/// store, scheduling engine, patient registry, billing engine) plug in here
/// without touching the coordinator.
#[async_trait]
pub trait SubAgent: Send + Sync {
    /// The category this agent answers for.
    fn category(&self) -> DelegateCategory;

    /// Human-readable name.
    fn name(&self) -> &str {
        self.category().display_name()
    }

    /// Handle a delegated request.
    ///
    /// Failures are reported as a result payload rather than an error.
    async fn handle(&self, argument: &IntentArgument) -> DelegationResult;
}
