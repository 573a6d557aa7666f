use crate::config::Config;
use crate::model::{Candidate, InputBundle};
use crate::proposer::ProposerTask;
use crate::state::RunState;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{debug, info, warn};

use super::agent::AgentRunner;

/// Candidates per task id. Every requested task has an entry.
pub type Proposals = BTreeMap<String, Vec<Candidate>>;

/// Runs all proposers concurrently and gathers their candidates
pub struct ProposalCollector {
    runner: Arc<AgentRunner>,
    state: Arc<RunState>,
    semaphore: Arc<Semaphore>,
    launch_delay: Duration,
    run_deadline: Option<Duration>,
}

impl ProposalCollector {
    pub fn new(config: &Config, state: Arc<RunState>) -> Self {
        Self {
            runner: Arc::new(AgentRunner::new(config, state.clone())),
            state,
            semaphore: Arc::new(Semaphore::new(config.concurrency.max(1))),
            launch_delay: Duration::from_millis(config.launch_delay_ms),
            run_deadline: config.run_deadline_sec.map(Duration::from_secs),
        }
    }

    /// Never fails: a task that errors, times out, or panics contributes an
    /// empty list under its own id.
    pub async fn collect(
        &self,
        bundle: Arc<InputBundle>,
        tasks: &[Arc<dyn ProposerTask>],
    ) -> Proposals {
        let start = std::time::Instant::now();
        let deadline = self.run_deadline.map(|d| Instant::now() + d);

        let mut results = Proposals::new();
        for task in tasks {
            self.state.register_task(task.id(), task.display_name());
            results.insert(task.id().to_string(), Vec::new());
        }

        info!(
            "Running {} proposers with concurrency {}",
            tasks.len(),
            self.semaphore.available_permits()
        );

        let mut futures = FuturesUnordered::new();

        for (idx, task) in tasks.iter().enumerate() {
            // Small delay between launches to avoid burst rate limits
            if idx > 0 && self.launch_delay > Duration::ZERO {
                sleep(self.launch_delay).await;
            }

            let task = task.clone();
            let runner = self.runner.clone();
            let state = self.state.clone();
            let semaphore = self.semaphore.clone();
            let bundle = bundle.clone();
            let task_id = task.id().to_string();

            let handle = tokio::spawn(async move {
                // hold until done
                let _permit = semaphore.acquire_owned().await.ok();
                let work = runner.run_with_fallback(task.as_ref(), &bundle);
                match deadline {
                    Some(deadline) => match timeout_at(deadline, work).await {
                        Ok(candidates) => candidates,
                        Err(_) => {
                            warn!("Proposer {} cut off by run deadline", task.id());
                            state.record_failure(task.id(), "run deadline exceeded", true);
                            Vec::new()
                        }
                    },
                    None => work.await,
                }
            });

            futures.push(async move { (task_id, handle.await) });
        }

        while let Some((task_id, joined)) = futures.next().await {
            match joined {
                Ok(candidates) => {
                    info!("Completed {}: {} candidates", task_id, candidates.len());
                    for (i, c) in candidates.iter().enumerate() {
                        debug!(
                            "  {}#{} [{:.2}] {}",
                            task_id,
                            i + 1,
                            c.confidence(),
                            c.text()
                        );
                    }
                    results.insert(task_id, candidates);
                }
                Err(e) => {
                    warn!("Task {} panicked: {}", task_id, e);
                    self.state
                        .record_failure(&task_id, &format!("task panicked: {}", e), false);
                }
            }
        }

        info!(
            "Collected {} candidates from {} proposers in {:.1}s",
            results.values().map(Vec::len).sum::<usize>(),
            results.len(),
            start.elapsed().as_secs_f64()
        );

        results
    }
}

/// Flatten proposals in registry order, keeping each task's own order
pub fn flatten(proposals: &Proposals, tasks: &[Arc<dyn ProposerTask>]) -> Vec<Candidate> {
    tasks
        .iter()
        .filter_map(|t| proposals.get(t.id()))
        .flat_map(|candidates| candidates.iter().cloned())
        .collect()
}
