use std::path::PathBuf;
use thiserror::Error;

#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum PolyprobeError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Proposer error: {0}")]
    Proposer(#[from] ProposerError),

    #[error("Candidate error: {0}")]
    Candidate(#[from] CandidateError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Duplicate proposer id '{0}'")]
    DuplicateProposer(String),

    #[error("No proposers enabled")]
    NoProposersEnabled,

    #[error("Unknown mode '{0}' (expected quick, standard or comprehensive)")]
    UnknownMode(String),

    #[error("Invalid constraints for mode '{mode}': {reason}")]
    InvalidConstraints { mode: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ProposerError {
    #[error("Execution timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Process failed with exit code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("Could not parse candidates from output: {0}")]
    Parse(String),

    #[error("Proposer failed: {0}")]
    Failed(String),
}

/// Rejection of a single candidate at construction time
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CandidateError {
    #[error("text has {len} characters, at least {min} required")]
    TextTooShort { len: usize, min: usize },

    #[error("rationale has {len} characters, at least {min} required")]
    RationaleTooShort { len: usize, min: usize },

    #[error("confidence {0} is outside [0, 1]")]
    ConfidenceOutOfRange(f64),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Selection constraints conflict: {0}")]
    ConstraintConflict(String),

    #[error("No proposers to run")]
    NoTasks,
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Failed to write report: {0}")]
    WriteReport(std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
