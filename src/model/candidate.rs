use crate::error::CandidateError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const MIN_TEXT_CHARS: usize = 10;
pub const MIN_RATIONALE_CHARS: usize = 20;

/// A proposed item. Only constructible through [`Candidate::new`], so every
/// instance satisfies the length and confidence invariants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    text: String,
    rationale: String,
    source_task_id: String,
    source_display_name: String,
    tags: Vec<String>,
    confidence: f64,
    metadata: Map<String, Value>,
}

impl Candidate {
    pub fn new(
        text: impl Into<String>,
        rationale: impl Into<String>,
        source_task_id: impl Into<String>,
        source_display_name: impl Into<String>,
        tags: Vec<String>,
        confidence: f64,
        metadata: Map<String, Value>,
    ) -> Result<Self, CandidateError> {
        let text = text.into();
        let rationale = rationale.into();

        let text_len = text.trim().chars().count();
        if text_len < MIN_TEXT_CHARS {
            return Err(CandidateError::TextTooShort {
                len: text_len,
                min: MIN_TEXT_CHARS,
            });
        }

        let rationale_len = rationale.trim().chars().count();
        if rationale_len < MIN_RATIONALE_CHARS {
            return Err(CandidateError::RationaleTooShort {
                len: rationale_len,
                min: MIN_RATIONALE_CHARS,
            });
        }

        // NaN fails the range check as well
        if !(0.0..=1.0).contains(&confidence) {
            return Err(CandidateError::ConfidenceOutOfRange(confidence));
        }

        Ok(Self {
            text,
            rationale,
            source_task_id: source_task_id.into(),
            source_display_name: source_display_name.into(),
            tags,
            confidence,
            metadata,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rationale(&self) -> &str {
        &self.rationale
    }

    pub fn source_task_id(&self) -> &str {
        &self.source_task_id
    }

    pub fn source_display_name(&self) -> &str {
        &self.source_display_name
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Character count of the trimmed text (not bytes)
    pub fn text_len(&self) -> usize {
        self.text.trim().chars().count()
    }

    pub fn rationale_len(&self) -> usize {
        self.rationale.trim().chars().count()
    }
}

/// Wire shape emitted by proposer processes and candidate files
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawCandidate {
    #[serde(alias = "question")]
    pub text: String,

    #[serde(default, alias = "reason", alias = "purpose")]
    pub rationale: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default = "default_confidence")]
    pub confidence: f64,

    #[serde(default)]
    pub metadata: Map<String, Value>,
}

fn default_confidence() -> f64 {
    0.7
}

impl RawCandidate {
    /// Validate and attach the producing task's identity
    pub fn into_candidate(
        self,
        source_task_id: &str,
        source_display_name: &str,
    ) -> Result<Candidate, CandidateError> {
        Candidate::new(
            self.text,
            self.rationale,
            source_task_id,
            source_display_name,
            self.tags,
            self.confidence,
            self.metadata,
        )
    }
}
