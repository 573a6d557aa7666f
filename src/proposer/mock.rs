//! In-process proposers for tests

use super::ProposerTask;
use crate::error::ProposerError;
use crate::model::{Candidate, InputBundle};
use async_trait::async_trait;
use serde_json::Map;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn candidate(task_id: &str, text: &str, confidence: f64) -> Candidate {
    tagged(task_id, text, confidence, &[])
}

pub fn tagged(task_id: &str, text: &str, confidence: f64, tags: &[&str]) -> Candidate {
    Candidate::new(
        text,
        "Checks whether the candidate understands the work in depth.",
        task_id,
        task_id.to_uppercase(),
        tags.iter().map(|t| t.to_string()).collect(),
        confidence,
        Map::new(),
    )
    .unwrap()
}

/// Counts mocks inside `propose` at the same time
#[derive(Default)]
pub struct InFlight {
    current: AtomicU32,
    peak: AtomicU32,
}

impl InFlight {
    pub fn peak(&self) -> u32 {
        self.peak.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Entered<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        Entered(self)
    }
}

struct Entered<'a>(&'a InFlight);

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

enum Behavior {
    Ok,
    /// Succeed after a fixed delay
    Slow(Duration),
    /// Fail this many times, then succeed
    Flaky(u32),
    Fail,
    Hang,
    Panic,
}

pub struct MockProposer {
    id: String,
    candidates: Vec<Candidate>,
    behavior: Behavior,
    timeout: Option<Duration>,
    calls: AtomicU32,
    gauge: Option<Arc<InFlight>>,
}

impl MockProposer {
    fn build(id: &str, candidates: Vec<Candidate>, behavior: Behavior) -> Self {
        Self {
            id: id.to_string(),
            candidates,
            behavior,
            timeout: None,
            calls: AtomicU32::new(0),
            gauge: None,
        }
    }

    pub fn ok(id: &str, candidates: Vec<Candidate>) -> Self {
        Self::build(id, candidates, Behavior::Ok)
    }

    pub fn flaky(id: &str, failures: u32, candidates: Vec<Candidate>) -> Self {
        Self::build(id, candidates, Behavior::Flaky(failures))
    }

    pub fn slow(id: &str, delay: Duration, candidates: Vec<Candidate>) -> Self {
        Self::build(id, candidates, Behavior::Slow(delay))
    }

    pub fn failing(id: &str) -> Self {
        Self::build(id, Vec::new(), Behavior::Fail)
    }

    pub fn hanging(id: &str) -> Self {
        Self::build(id, Vec::new(), Behavior::Hang)
    }

    pub fn panicking(id: &str) -> Self {
        Self::build(id, Vec::new(), Behavior::Panic)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_gauge(mut self, gauge: Arc<InFlight>) -> Self {
        self.gauge = Some(gauge);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProposerTask for MockProposer {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.id
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn propose(&self, _bundle: &InputBundle) -> Result<Vec<Candidate>, ProposerError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let _entered = self.gauge.as_deref().map(InFlight::enter);
        match self.behavior {
            Behavior::Ok => Ok(self.candidates.clone()),
            Behavior::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(self.candidates.clone())
            }
            Behavior::Flaky(failures) if n < failures => {
                Err(ProposerError::Failed(format!("transient failure {}", n + 1)))
            }
            Behavior::Flaky(_) => Ok(self.candidates.clone()),
            Behavior::Fail => Err(ProposerError::Failed("upstream unavailable".to_string())),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
            Behavior::Panic => panic!("proposer {} exploded", self.id),
        }
    }
}
