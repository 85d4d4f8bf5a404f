//! Sub-agent executor: latency simulation plus category dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use komando_common::{DelegateCategory, DelegationResult, IntentArgument, SubAgent};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{AppointmentsAgent, BillingAgent, MedicalRecordsAgent, PatientManagementAgent};

/// Response returned when no sub-agent answers for the requested category.
pub const UNRECOGNIZED_DELEGATE_RESPONSE: &str = "Error: Sub-agen tidak dikenali.";

/// Simulated processing latency for delegated requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Base delay before a sub-agent answers
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// Upper bound of the extra delay added on top of `latency_ms`
    #[serde(default)]
    pub jitter_ms: u64,
}

fn default_latency_ms() -> u64 {
    1500
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            jitter_ms: 0,
        }
    }
}

impl ExecutorConfig {
    pub fn immediate() -> Self {
        Self {
            latency_ms: 0,
            jitter_ms: 0,
        }
    }
}

/// Dispatches delegated requests to the registered sub-agent for a category.
///
/// `execute` always resolves: an unregistered category (including
/// `Coordinator`, reachable through the router's fallback) yields the
/// [`UNRECOGNIZED_DELEGATE_RESPONSE`] sentinel tagged as `Coordinator`.
pub struct SubAgentExecutor {
    agents: HashMap<DelegateCategory, Arc<dyn SubAgent>>,
    config: ExecutorConfig,
    calls: AtomicU32,
}

impl SubAgentExecutor {
    /// An executor with no agents registered.
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            agents: HashMap::new(),
            config,
            calls: AtomicU32::new(0),
        }
    }

    /// An executor with the four built-in sub-agents.
    pub fn with_default_agents(config: ExecutorConfig) -> Self {
        let mut executor = Self::new(config);
        executor.register(Arc::new(MedicalRecordsAgent::new()));
        executor.register(Arc::new(AppointmentsAgent::new()));
        executor.register(Arc::new(PatientManagementAgent::new()));
        executor.register(Arc::new(BillingAgent::new()));
        executor
    }

    /// Register (or replace) the agent answering for its category.
    pub fn register(&mut self, agent: Arc<dyn SubAgent>) -> &mut Self {
        let category = agent.category();
        if category == DelegateCategory::Coordinator {
            warn!(agent = %agent.name(), "Ignoring sub-agent registered for the coordinator");
            return self;
        }
        if self.agents.insert(category, agent).is_some() {
            debug!(%category, "Replaced sub-agent");
        }
        self
    }

    pub fn has_agent(&self, category: DelegateCategory) -> bool {
        self.agents.contains_key(&category)
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run the sub-agent for `category` after the simulated latency.
    pub async fn execute(
        &self,
        category: DelegateCategory,
        argument: &IntentArgument,
    ) -> DelegationResult {
        let delay = self.next_delay();
        info!(%category, delay_ms = delay.as_millis() as u64, "Executing sub-agent");

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match self.agents.get(&category) {
            Some(agent) => {
                let result = agent.handle(argument).await;
                debug!(%category, chars = result.text.len(), "Sub-agent responded");
                result
            }
            None => {
                warn!(%category, "No sub-agent registered for category");
                DelegationResult::new(DelegateCategory::Coordinator, UNRECOGNIZED_DELEGATE_RESPONSE)
            }
        }
    }

    fn next_delay(&self) -> Duration {
        let attempt = self.calls.fetch_add(1, Ordering::Relaxed);
        let jitter = if self.config.jitter_ms == 0 {
            0
        } else {
            (rand_jitter(attempt) * self.config.jitter_ms as f64) as u64
        };
        Duration::from_millis(self.config.latency_ms.saturating_add(jitter))
    }
}

/// Deterministic jitter in `[0, 1)` from the call counter.
fn rand_jitter(attempt: u32) -> f64 {
    let x = attempt.wrapping_mul(2654435761);
    (x % 100) as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use komando_common::Intent;

    struct EchoAgent;

    #[async_trait]
    impl SubAgent for EchoAgent {
        fn category(&self) -> DelegateCategory {
            DelegateCategory::Billing
        }

        async fn handle(&self, _argument: &IntentArgument) -> DelegationResult {
            DelegationResult::new(DelegateCategory::Billing, "echo")
        }
    }

    fn request(text: &str) -> IntentArgument {
        Intent::with_request("x", text).argument
    }

    #[tokio::test]
    async fn every_delegate_category_tags_its_result() {
        let executor = SubAgentExecutor::with_default_agents(ExecutorConfig::immediate());
        for category in DelegateCategory::DELEGATES {
            let result = executor.execute(category, &request("halo")).await;
            assert_eq!(result.category, category);
            assert!(result.text.contains("halo"));
        }
    }

    #[tokio::test]
    async fn coordinator_returns_sentinel() {
        let executor = SubAgentExecutor::with_default_agents(ExecutorConfig::immediate());
        let result = executor
            .execute(DelegateCategory::Coordinator, &request("apa saja"))
            .await;
        assert_eq!(result.category, DelegateCategory::Coordinator);
        assert_eq!(result.text, UNRECOGNIZED_DELEGATE_RESPONSE);
    }

    #[tokio::test]
    async fn unregistered_category_returns_sentinel() {
        let executor = SubAgentExecutor::new(ExecutorConfig::immediate());
        let result = executor
            .execute(DelegateCategory::Appointments, &request("jadwal"))
            .await;
        assert_eq!(result.category, DelegateCategory::Coordinator);
        assert_eq!(result.text, UNRECOGNIZED_DELEGATE_RESPONSE);
    }

    #[tokio::test]
    async fn register_replaces_existing_agent() {
        let mut executor = SubAgentExecutor::with_default_agents(ExecutorConfig::immediate());
        executor.register(Arc::new(EchoAgent));
        let result = executor.execute(DelegateCategory::Billing, &request("biaya")).await;
        assert_eq!(result.text, "echo");
    }

    #[tokio::test(start_paused = true)]
    async fn latency_is_a_suspension_point() {
        let executor = Arc::new(SubAgentExecutor::with_default_agents(ExecutorConfig {
            latency_ms: 1500,
            jitter_ms: 0,
        }));

        let start = tokio::time::Instant::now();
        let task = {
            let executor = executor.clone();
            tokio::spawn(async move {
                executor
                    .execute(DelegateCategory::MedicalRecords, &request("lab"))
                    .await
            })
        };

        // The runtime stays free while the executor sleeps.
        tokio::task::yield_now().await;
        assert!(!task.is_finished());

        let result = task.await.unwrap();
        assert_eq!(result.category, DelegateCategory::MedicalRecords);
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[test]
    fn jitter_stays_within_bound() {
        let executor = SubAgentExecutor::new(ExecutorConfig {
            latency_ms: 100,
            jitter_ms: 50,
        });
        for _ in 0..20 {
            let delay = executor.next_delay();
            assert!(delay >= Duration::from_millis(100));
            assert!(delay < Duration::from_millis(150));
        }
    }

    #[test]
    fn executor_config_defaults() {
        let config: ExecutorConfig = toml::from_str("").unwrap();
        assert_eq!(config.latency_ms, 1500);
        assert_eq!(config.jitter_ms, 0);
    }
}
