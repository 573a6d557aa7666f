//! Consolidation pipeline: collect, dedupe, filter, label, select, review,
//! assemble. Each stage owns its input and hands a new value to the next.

mod assembler;
mod dedupe;
mod gatekeeper;
mod labeler;
mod quality;
mod selector;

use assembler::assemble;
use dedupe::dedupe;
use gatekeeper::review;
use labeler::label;
use quality::filter as quality_filter;
use selector::select;

use crate::config::Config;
use crate::error::PipelineError;
use crate::model::{InputBundle, OutputRecord};
use crate::output::DebugSink;
use crate::proposer::ProposerTask;
use crate::runner::{flatten, ProposalCollector};
use crate::state::{RunSnapshot, RunState};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Item counts after each stage
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageCounts {
    pub proposed: usize,
    pub deduplicated: usize,
    pub quality_passed: usize,
    pub selected: usize,
    pub approved: usize,
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub records: Vec<OutputRecord>,
    pub snapshot: RunSnapshot,
    pub counts: StageCounts,
}

fn dump<T: Serialize>(sink: &dyn DebugSink, stage: &str, payload: &T) {
    match serde_json::to_value(payload) {
        Ok(value) => sink.dump(stage, &value),
        Err(e) => warn!("Could not serialize debug stage '{}': {}", stage, e),
    }
}

/// Run every stage once. Task failures end up in the snapshot; only a
/// constraint conflict or an empty task list fails the run.
pub async fn run_pipeline(
    config: &Config,
    bundle: InputBundle,
    tasks: &[Arc<dyn ProposerTask>],
    sink: &dyn DebugSink,
) -> Result<PipelineOutput, PipelineError> {
    if tasks.is_empty() {
        return Err(PipelineError::NoTasks);
    }

    let constraints = config.constraints(bundle.mode).clone();
    constraints
        .check()
        .map_err(PipelineError::ConstraintConflict)?;

    let state = Arc::new(RunState::new(uuid::Uuid::new_v4().to_string()));
    let bundle = Arc::new(bundle);
    let mut counts = StageCounts::default();

    let collector = ProposalCollector::new(config, state.clone());
    let proposals = collector.collect(bundle.clone(), tasks).await;
    dump(sink, "raw_proposals", &proposals);

    let pool = flatten(&proposals, tasks);
    counts.proposed = pool.len();

    let pool = dedupe(pool);
    counts.deduplicated = pool.len();

    let pool = quality_filter(pool, &config.quality);
    counts.quality_passed = pool.len();
    if pool.is_empty() {
        warn!("No candidates survived filtering");
        state.record_error("quality", "no candidates survived filtering");
    }

    let scored = label(pool, &bundle, &config.labeler);
    dump(sink, "scored_pool", &scored);

    let selected = select(scored, &constraints)?;
    counts.selected = selected.len();
    dump(sink, "selection", &selected);

    let approved = review(selected, &config.gatekeeper);
    counts.approved = approved.len();
    dump(
        sink,
        "gatekeeper",
        &serde_json::json!({ "before": counts.selected, "after": counts.approved }),
    );

    let records = assemble(approved);

    info!(
        "Pipeline: {} proposed -> {} unique -> {} passed quality -> {} selected -> {} approved",
        counts.proposed, counts.deduplicated, counts.quality_passed, counts.selected, counts.approved
    );

    Ok(PipelineOutput {
        records,
        snapshot: state.snapshot(),
        counts,
    })
}
