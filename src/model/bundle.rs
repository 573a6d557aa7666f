use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Run mode; selects which `SelectionConstraints` apply
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[serde(alias = "a")]
    Quick,
    #[default]
    #[serde(alias = "b")]
    Standard,
    #[serde(alias = "c")]
    Comprehensive,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Quick => write!(f, "quick"),
            Mode::Standard => write!(f, "standard"),
            Mode::Comprehensive => write!(f, "comprehensive"),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quick" | "a" => Ok(Mode::Quick),
            "standard" | "b" => Ok(Mode::Standard),
            "comprehensive" | "c" => Ok(Mode::Comprehensive),
            _ => Err(format!("Unknown mode: {}", s)),
        }
    }
}

/// Immutable per-run context handed to every proposer
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputBundle {
    /// Free-text material the proposers work from
    pub corpus: String,

    #[serde(default)]
    pub mode: Mode,

    /// Domain tag used for relevance scoring
    #[serde(default)]
    pub domain: Option<String>,

    /// Optional retrieved context, keyed by source
    #[serde(default)]
    pub context: BTreeMap<String, String>,
}

impl InputBundle {
    pub fn new(corpus: impl Into<String>, mode: Mode) -> Self {
        Self {
            corpus: corpus.into(),
            mode,
            domain: None,
            context: BTreeMap::new(),
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}
