use crate::error::OutputError;
use crate::pipeline::StageCounts;
use crate::state::{RunError, RunSnapshot, TaskStatus};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryReport {
    pub run_id: String,
    pub timestamp: String,
    pub started_at: String,
    pub mode: String,
    pub duration_sec: f64,
    pub proposers: Vec<ProposerSummary>,
    pub stages: StageSummary,
    pub records: usize,
    pub llm_calls: u64,
    pub cost_estimate: f64,
    pub failed: Vec<String>,
    pub errors: Vec<ErrorSummary>,
    pub report_dir: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProposerSummary {
    pub id: String,
    pub name: String,
    pub status: String,
    pub attempts: u32,
    pub latency_ms: u64,
    pub candidates: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StageSummary {
    pub proposed: usize,
    pub deduplicated: usize,
    pub quality_passed: usize,
    pub selected: usize,
    pub approved: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub source: String,
    pub message: String,
    pub at: String,
}

pub fn write_summary(
    report_dir: &Path,
    snapshot: &RunSnapshot,
    counts: &StageCounts,
    records: usize,
    mode: &str,
) -> Result<(), OutputError> {
    fs::create_dir_all(report_dir).map_err(OutputError::CreateDir)?;

    let summary = build_summary(snapshot, counts, records, mode, report_dir.to_path_buf());

    let json_path = report_dir.join("summary.json");
    let json = serde_json::to_string_pretty(&summary)?;
    fs::write(&json_path, json).map_err(OutputError::WriteReport)?;

    let md_path = report_dir.join("summary.md");
    let md = build_summary_markdown(&summary);
    fs::write(&md_path, md).map_err(OutputError::WriteReport)?;

    Ok(())
}

fn build_summary(
    snapshot: &RunSnapshot,
    counts: &StageCounts,
    records: usize,
    mode: &str,
    report_dir: PathBuf,
) -> SummaryReport {
    let mut failed = Vec::new();

    let proposers = snapshot
        .tasks
        .iter()
        .map(|(id, task)| {
            let (status, reason) = match &task.status {
                TaskStatus::Pending => ("pending".to_string(), None),
                TaskStatus::Completed => ("completed".to_string(), None),
                TaskStatus::TimedOut { error } => {
                    failed.push(id.clone());
                    ("timed_out".to_string(), Some(error.clone()))
                }
                TaskStatus::Failed { error } => {
                    failed.push(id.clone());
                    ("failed".to_string(), Some(error.clone()))
                }
            };

            ProposerSummary {
                id: id.clone(),
                name: task.display_name.clone(),
                status,
                attempts: task.attempts,
                latency_ms: task.latency_ms,
                candidates: task.candidate_count,
                reason,
            }
        })
        .collect();

    let now = Utc::now();
    let duration_sec = (now - snapshot.started_at)
        .to_std()
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);

    SummaryReport {
        run_id: snapshot.run_id.clone(),
        timestamp: now.to_rfc3339(),
        started_at: snapshot.started_at.to_rfc3339(),
        mode: mode.to_string(),
        duration_sec,
        proposers,
        stages: StageSummary {
            proposed: counts.proposed,
            deduplicated: counts.deduplicated,
            quality_passed: counts.quality_passed,
            selected: counts.selected,
            approved: counts.approved,
        },
        records,
        llm_calls: snapshot.llm_calls,
        cost_estimate: snapshot.cost_estimate,
        failed,
        errors: snapshot.errors.iter().map(error_summary).collect(),
        report_dir,
    }
}

fn error_summary(error: &RunError) -> ErrorSummary {
    ErrorSummary {
        source: error.source.clone(),
        message: error.message.clone(),
        at: error.at.to_rfc3339(),
    }
}

fn build_summary_markdown(summary: &SummaryReport) -> String {
    let mut md = String::new();

    md.push_str("# polyprobe Summary\n\n");
    md.push_str(&format!("**Run:** `{}`\n", summary.run_id));
    md.push_str(&format!("**Generated:** {}\n", summary.timestamp));
    md.push_str(&format!("**Mode:** {}\n", summary.mode));
    md.push_str(&format!(
        "**Report Dir:** {}\n",
        summary.report_dir.display()
    ));
    md.push_str(&format!("**Duration:** {:.1}s\n", summary.duration_sec));
    md.push_str(&format!(
        "**Calls:** {} (est. cost ${:.2})\n\n",
        summary.llm_calls, summary.cost_estimate
    ));

    md.push_str("## Stages\n\n");
    md.push_str("| Stage | Count |\n");
    md.push_str("|-------|-------|\n");
    md.push_str(&format!("| Proposed | {} |\n", summary.stages.proposed));
    md.push_str(&format!("| After dedupe | {} |\n", summary.stages.deduplicated));
    md.push_str(&format!("| Passed quality | {} |\n", summary.stages.quality_passed));
    md.push_str(&format!("| Selected | {} |\n", summary.stages.selected));
    md.push_str(&format!("| Approved | {} |\n\n", summary.stages.approved));

    md.push_str("## Proposers\n\n");
    md.push_str("| Proposer | Status | Candidates | Attempts | Latency |\n");
    md.push_str("|----------|--------|------------|----------|---------|\n");

    for proposer in &summary.proposers {
        let status_icon = match proposer.status.as_str() {
            "completed" => "✅",
            "timed_out" => "⏱️",
            "failed" => "❌",
            _ => "❓",
        };

        let status_str = if let Some(reason) = &proposer.reason {
            format!("{} {} ({})", status_icon, proposer.status, reason)
        } else {
            format!("{} {}", status_icon, proposer.status)
        };

        md.push_str(&format!(
            "| {} | {} | {} | {} | {}ms |\n",
            proposer.name, status_str, proposer.candidates, proposer.attempts, proposer.latency_ms
        ));
    }

    if !summary.errors.is_empty() {
        md.push_str("\n## Errors\n\n");
        for error in &summary.errors {
            md.push_str(&format!("- `{}`: {}\n", error.source, error.message));
        }
    }

    md
}
