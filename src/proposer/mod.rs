mod command;
mod file;
#[cfg(test)]
pub mod mock;
mod parse;

pub use command::CommandProposer;
pub use file::FileProposer;
pub use parse::parse_candidates;

use crate::config::{Config, ProposerConfig, ProposerKind};
use crate::error::ProposerError;
use crate::model::{Candidate, InputBundle};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// One independent source of candidates
#[async_trait]
pub trait ProposerTask: Send + Sync {
    fn id(&self) -> &str;

    fn display_name(&self) -> &str;

    /// Per-task timeout override; `None` uses the runner default
    fn timeout(&self) -> Option<Duration> {
        None
    }

    async fn propose(&self, bundle: &InputBundle) -> Result<Vec<Candidate>, ProposerError>;
}

/// Create a proposer from its configuration
pub fn create_proposer(proposer: &ProposerConfig) -> Arc<dyn ProposerTask> {
    let timeout = proposer.timeout_sec.map(Duration::from_secs);
    match &proposer.kind {
        ProposerKind::Command { program, args } => Arc::new(CommandProposer {
            id: proposer.id.clone(),
            name: proposer.name.clone(),
            program: program.clone(),
            args: args.clone(),
            timeout,
        }),
        ProposerKind::File { path } => Arc::new(FileProposer {
            id: proposer.id.clone(),
            name: proposer.name.clone(),
            path: path.clone(),
            timeout,
        }),
    }
}

/// Build the fixed proposer registry for a run, in config order
pub fn registry(config: &Config, filter: Option<&[String]>) -> Vec<Arc<dyn ProposerTask>> {
    config
        .proposers
        .iter()
        .filter(|p| p.enabled)
        .filter(|p| filter.map(|f| f.contains(&p.id)).unwrap_or(true))
        .map(create_proposer)
        .collect()
}
