use super::Candidate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 5.0;

/// Coarse topical category used for coverage constraints.
/// Declaration order is the classification precedence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Foundation,
    ResearchMethod,
    Project,
    SoftSkill,
    Reflection,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Foundation,
        Dimension::ResearchMethod,
        Dimension::Project,
        Dimension::SoftSkill,
        Dimension::Reflection,
    ];
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Foundation => write!(f, "foundation"),
            Dimension::ResearchMethod => write!(f, "research_method"),
            Dimension::Project => write!(f, "project"),
            Dimension::SoftSkill => write!(f, "soft_skill"),
            Dimension::Reflection => write!(f, "reflection"),
        }
    }
}

/// Coarse complexity category used for balance constraints
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Basic,
    Intermediate,
    Killer,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Basic, Difficulty::Intermediate, Difficulty::Killer];
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Basic => write!(f, "basic"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Killer => write!(f, "killer"),
        }
    }
}

/// A candidate annotated by the labeler. Later stages only keep or drop it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedCandidate {
    pub candidate: Candidate,
    pub dimension: Dimension,
    pub difficulty: Difficulty,
    pub score: f64,
}

impl EnrichedCandidate {
    pub fn new(candidate: Candidate, dimension: Dimension, difficulty: Difficulty, score: f64) -> Self {
        Self {
            candidate,
            dimension,
            difficulty,
            score: score.clamp(MIN_SCORE, MAX_SCORE),
        }
    }

    pub fn source_task_id(&self) -> &str {
        self.candidate.source_task_id()
    }

    pub fn text(&self) -> &str {
        self.candidate.text()
    }
}
