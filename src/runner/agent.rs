use crate::config::{Config, RetryConfig};
use crate::error::ProposerError;
use crate::model::{Candidate, InputBundle};
use crate::proposer::ProposerTask;
use crate::state::RunState;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout as tokio_timeout;
use tracing::{debug, warn};

use super::retry::retry_with_backoff;

/// Wraps proposer calls with a per-attempt timeout and bounded retries
pub struct AgentRunner {
    retry: RetryConfig,
    default_timeout: Duration,
    cost_per_call: f64,
    state: Arc<RunState>,
}

impl AgentRunner {
    pub fn new(config: &Config, state: Arc<RunState>) -> Self {
        Self {
            retry: config.retry.clone(),
            default_timeout: Duration::from_secs(config.timeout_sec),
            cost_per_call: config.cost_per_call,
            state,
        }
    }

    /// Run one task, surfacing the terminal error once retries are exhausted
    pub async fn run(
        &self,
        task: &dyn ProposerTask,
        bundle: &InputBundle,
    ) -> Result<Vec<Candidate>, ProposerError> {
        let timeout = task.timeout().unwrap_or(self.default_timeout);
        let state = &self.state;
        let cost = self.cost_per_call;
        let start = std::time::Instant::now();

        let result = retry_with_backoff(&self.retry, move || async move {
            state.record_attempt(task.id(), cost);
            match tokio_timeout(timeout, task.propose(bundle)).await {
                Ok(result) => result,
                Err(_) => Err(ProposerError::Timeout(timeout)),
            }
        })
        .await;

        self.state.record_latency(task.id(), start.elapsed());
        debug!("Proposer {} finished in {:?}", task.id(), start.elapsed());

        result
    }

    /// Run one task; any terminal error becomes an empty list plus a
    /// recorded error
    pub async fn run_with_fallback(
        &self,
        task: &dyn ProposerTask,
        bundle: &InputBundle,
    ) -> Vec<Candidate> {
        match self.run(task, bundle).await {
            Ok(candidates) => {
                self.state.record_success(task.id(), &candidates);
                candidates
            }
            Err(e) => {
                warn!("Proposer {} failed after retries: {}", task.id(), e);
                let timed_out = matches!(e, ProposerError::Timeout(_));
                self.state.record_failure(task.id(), &e.to_string(), timed_out);
                Vec::new()
            }
        }
    }
}
