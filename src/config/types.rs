use crate::model::{Difficulty, Dimension, Mode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use super::defaults::*;

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Per-attempt proposer timeout
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,

    /// Maximum proposers running at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_launch_delay_ms")]
    pub launch_delay_ms: u64,

    /// Overall deadline for the collection phase
    #[serde(default)]
    pub run_deadline_sec: Option<u64>,

    #[serde(default)]
    pub retry: RetryConfig,

    /// Cost estimate charged per proposer attempt
    #[serde(default)]
    pub cost_per_call: f64,

    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    /// When set, stage dumps are written here as JSON
    #[serde(default)]
    pub debug_dir: Option<PathBuf>,

    #[serde(default)]
    pub quality: QualityConfig,

    #[serde(default)]
    pub labeler: LabelerConfig,

    #[serde(default)]
    pub gatekeeper: GatekeeperConfig,

    #[serde(default)]
    pub modes: ModesConfig,

    #[serde(default)]
    pub proposers: Vec<ProposerConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Upper bound of random jitter added to each backoff (0 disables)
    #[serde(default)]
    pub jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            jitter_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct QualityConfig {
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,

    #[serde(default = "default_min_rationale_chars")]
    pub min_rationale_chars: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            min_text_chars: default_min_text_chars(),
            min_rationale_chars: default_min_rationale_chars(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct LabelerConfig {
    /// Dimension assumed for a proposer when no tag matches
    #[serde(default = "default_source_dimensions")]
    pub source_dimensions: HashMap<String, Dimension>,

    #[serde(default = "default_fallback_dimension")]
    pub fallback_dimension: Dimension,
}

impl Default for LabelerConfig {
    fn default() -> Self {
        Self {
            source_dimensions: default_source_dimensions(),
            fallback_dimension: default_fallback_dimension(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct GatekeeperConfig {
    #[serde(default = "default_disallowed_tokens")]
    pub disallowed_tokens: Vec<String>,

    #[serde(default = "default_trick_tokens")]
    pub trick_tokens: Vec<String>,

    #[serde(default = "default_gatekeeper_min_score")]
    pub min_score: f64,
}

impl Default for GatekeeperConfig {
    fn default() -> Self {
        Self {
            disallowed_tokens: default_disallowed_tokens(),
            trick_tokens: default_trick_tokens(),
            min_score: default_gatekeeper_min_score(),
        }
    }
}

/// Target/min/max counts plus coverage and balance targets for one mode
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct SelectionConstraints {
    pub target_count: usize,

    pub min_count: usize,

    pub max_count: usize,

    #[serde(default)]
    pub dimension_minimums: BTreeMap<Dimension, usize>,

    #[serde(default)]
    pub difficulty_ratios: BTreeMap<Difficulty, f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ModesConfig {
    #[serde(default = "default_quick_constraints")]
    pub quick: SelectionConstraints,

    #[serde(default = "default_standard_constraints")]
    pub standard: SelectionConstraints,

    #[serde(default = "default_comprehensive_constraints")]
    pub comprehensive: SelectionConstraints,
}

impl Default for ModesConfig {
    fn default() -> Self {
        Self {
            quick: default_quick_constraints(),
            standard: default_standard_constraints(),
            comprehensive: default_comprehensive_constraints(),
        }
    }
}

impl ModesConfig {
    pub fn for_mode(&self, mode: Mode) -> &SelectionConstraints {
        match mode {
            Mode::Quick => &self.quick,
            Mode::Standard => &self.standard,
            Mode::Comprehensive => &self.comprehensive,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ProposerConfig {
    pub id: String,

    pub name: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub timeout_sec: Option<u64>,

    #[serde(flatten)]
    pub kind: ProposerKind,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProposerKind {
    /// External generator; receives the bundle as JSON on stdin
    Command {
        program: PathBuf,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Static candidate list in YAML or JSON
    File { path: PathBuf },
}

impl std::fmt::Display for ProposerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProposerKind::Command { program, .. } => write!(f, "command:{}", program.display()),
            ProposerKind::File { path } => write!(f, "file:{}", path.display()),
        }
    }
}
