use crate::model::Candidate;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Per-run telemetry and error accumulator.
///
/// Shared by the collector and its runners; every write goes through the
/// mutex, which is never held across an await point. Once the run returns,
/// [`RunState::snapshot`] yields the frozen view.
#[derive(Debug)]
pub struct RunState {
    inner: Mutex<RunSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSnapshot {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub tasks: BTreeMap<String, TaskTelemetry>,
    pub llm_calls: u64,
    pub cost_estimate: f64,
    pub errors: Vec<RunError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskTelemetry {
    pub display_name: String,
    pub status: TaskStatus,
    pub attempts: u32,
    pub latency_ms: u64,
    pub candidate_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
    TimedOut { error: String },
    Failed { error: String },
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::TimedOut { error } => write!(f, "timed_out: {}", error),
            TaskStatus::Failed { error } => write!(f, "failed: {}", error),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunError {
    /// Task id, or pipeline stage name for non-task errors
    pub source: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl RunState {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(RunSnapshot {
                run_id: run_id.into(),
                started_at: Utc::now(),
                tasks: BTreeMap::new(),
                llm_calls: 0,
                cost_estimate: 0.0,
                errors: Vec::new(),
            }),
        }
    }

    // Telemetry must survive a panicking writer
    fn lock(&self) -> MutexGuard<'_, RunSnapshot> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register_task(&self, task_id: &str, display_name: &str) {
        self.lock().tasks.insert(
            task_id.to_string(),
            TaskTelemetry {
                display_name: display_name.to_string(),
                status: TaskStatus::Pending,
                attempts: 0,
                latency_ms: 0,
                candidate_count: 0,
            },
        );
    }

    /// Count one proposer invocation and its estimated cost
    pub fn record_attempt(&self, task_id: &str, cost: f64) {
        let mut inner = self.lock();
        inner.llm_calls += 1;
        inner.cost_estimate += cost;
        if let Some(task) = inner.tasks.get_mut(task_id) {
            task.attempts += 1;
        }
    }

    pub fn record_latency(&self, task_id: &str, latency: Duration) {
        if let Some(task) = self.lock().tasks.get_mut(task_id) {
            task.latency_ms = latency.as_millis() as u64;
        }
    }

    pub fn record_success(&self, task_id: &str, candidates: &[Candidate]) {
        if let Some(task) = self.lock().tasks.get_mut(task_id) {
            task.status = TaskStatus::Completed;
            task.candidate_count = candidates.len();
        }
    }

    pub fn record_failure(&self, task_id: &str, error: &str, timed_out: bool) {
        let mut inner = self.lock();
        if let Some(task) = inner.tasks.get_mut(task_id) {
            task.status = if timed_out {
                TaskStatus::TimedOut {
                    error: error.to_string(),
                }
            } else {
                TaskStatus::Failed {
                    error: error.to_string(),
                }
            };
            task.candidate_count = 0;
        }
        inner.errors.push(RunError {
            source: task_id.to_string(),
            message: error.to_string(),
            at: Utc::now(),
        });
    }

    /// Record an error not tied to a single task
    pub fn record_error(&self, source: &str, message: &str) {
        self.lock().errors.push(RunError {
            source: source.to_string(),
            message: message.to_string(),
            at: Utc::now(),
        });
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.lock().clone()
    }
}

impl RunSnapshot {
    pub fn failed_tasks(&self) -> Vec<&str> {
        self.tasks
            .iter()
            .filter(|(_, t)| matches!(t.status, TaskStatus::Failed { .. } | TaskStatus::TimedOut { .. }))
            .map(|(id, _)| id.as_str())
            .collect()
    }
}
