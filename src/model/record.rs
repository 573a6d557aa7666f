use super::{Difficulty, Dimension};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Final externally visible record
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutputRecord {
    /// 1-indexed position in the final list
    pub id: usize,

    pub fingerprint: String,

    pub text: String,

    pub rationale: String,

    pub dimension: Dimension,

    pub difficulty: Difficulty,

    pub score: f64,

    pub source_task_id: String,

    pub source_display_name: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// What the item examines, derived from its dimension
    pub focus: String,

    /// How to approach it, derived from difficulty and tags
    pub guidance: String,
}

impl OutputRecord {
    /// Normalize text for stable fingerprinting
    /// Collapses whitespace and case that might differ between runs
    pub fn normalize_text(text: &str) -> String {
        text.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Deterministic fingerprint: source_task_id | normalized_text
    pub fn fingerprint_for(source_task_id: &str, text: &str) -> String {
        let input = format!("{}|{}", source_task_id, Self::normalize_text(text));
        let hash = Sha256::digest(input.as_bytes());
        format!("{:x}", hash)[..12].to_string()
    }
}
