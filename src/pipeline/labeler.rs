//! Rule-based dimension/difficulty classification and relevance scoring.
//!
//! Keyword lists are fixed and matched as lowercase substrings, so a tag
//! like "metadata" matches "data". Known precision limit.

use crate::config::LabelerConfig;
use crate::model::{Candidate, Difficulty, Dimension, EnrichedCandidate, InputBundle};
use serde_json::Value;
use tracing::debug;

const FOUNDATION_KEYWORDS: &[&str] = &[
    "theory",
    "theoretical",
    "concept",
    "definition",
    "fundamental",
    "foundation",
    "principle",
    "literature",
    "background",
];

const RESEARCH_METHOD_KEYWORDS: &[&str] = &[
    "method",
    "experiment",
    "sample",
    "data",
    "statistic",
    "analysis",
    "validity",
    "survey",
    "measurement",
];

const PROJECT_KEYWORDS: &[&str] = &[
    "project",
    "implementation",
    "system",
    "engineering",
    "application",
    "prototype",
    "result",
    "contribution",
    "innovation",
];

const SOFT_SKILL_KEYWORDS: &[&str] = &[
    "communication",
    "teamwork",
    "collaboration",
    "leadership",
    "presentation",
    "time management",
    "conflict",
    "soft skill",
];

const REFLECTION_KEYWORDS: &[&str] = &[
    "reflection",
    "limitation",
    "future work",
    "lesson",
    "improvement",
    "weakness",
    "retrospective",
];

const KILLER_INDICATORS: &[&str] = &[
    "why not",
    "what if",
    "challenge",
    "critique",
    "defend",
    "justify",
    "flaw",
    "contradict",
    "alternative",
    "worst case",
    "assumption",
];

const BASIC_INDICATORS: &[&str] = &[
    "what is",
    "define",
    "describe",
    "introduce",
    "briefly",
    "overview",
    "list the",
];

const BASE_SCORE: f64 = 3.0;
const CONFIDENCE_PIVOT: f64 = 0.7;
const CONFIDENCE_WEIGHT: f64 = 5.0;
const DOMAIN_BONUS: f64 = 0.5;
const LONG_RATIONALE_BONUS: f64 = 0.3;
const LONG_RATIONALE_CHARS: usize = 100;
const COMPLEXITY_BONUS: f64 = 0.3;
const LONG_TEXT_CHARS: usize = 100;
const LOW_CONFIDENCE: f64 = 0.7;

/// Precedence order; the first dimension with a matching tag wins
const DIMENSION_RULES: [(Dimension, &[&str]); 5] = [
    (Dimension::Foundation, FOUNDATION_KEYWORDS),
    (Dimension::ResearchMethod, RESEARCH_METHOD_KEYWORDS),
    (Dimension::Project, PROJECT_KEYWORDS),
    (Dimension::SoftSkill, SOFT_SKILL_KEYWORDS),
    (Dimension::Reflection, REFLECTION_KEYWORDS),
];

pub fn classify_dimension(candidate: &Candidate, config: &LabelerConfig) -> Dimension {
    let tags: Vec<String> = candidate.tags().iter().map(|t| t.to_lowercase()).collect();

    for (dimension, keywords) in DIMENSION_RULES {
        let hit = tags
            .iter()
            .any(|tag| keywords.iter().any(|kw| tag.contains(kw)));
        if hit {
            return dimension;
        }
    }

    config
        .source_dimensions
        .get(candidate.source_task_id())
        .copied()
        .unwrap_or(config.fallback_dimension)
}

pub fn classify_difficulty(candidate: &Candidate) -> Difficulty {
    let haystack = format!(
        "{} {}",
        candidate.text().to_lowercase(),
        candidate.rationale().to_lowercase()
    );

    if KILLER_INDICATORS.iter().any(|kw| haystack.contains(kw)) {
        return Difficulty::Killer;
    }
    if BASIC_INDICATORS.iter().any(|kw| haystack.contains(kw)) {
        return Difficulty::Basic;
    }
    if candidate.text_len() > LONG_TEXT_CHARS {
        return Difficulty::Intermediate;
    }
    if candidate.confidence() < LOW_CONFIDENCE {
        return Difficulty::Killer;
    }
    Difficulty::Intermediate
}

fn is_high_complexity(candidate: &Candidate) -> bool {
    let metadata = candidate.metadata();
    let by_label = metadata
        .get("complexity")
        .and_then(Value::as_str)
        .map(|s| s.eq_ignore_ascii_case("high"))
        .unwrap_or(false);
    let by_flag = metadata
        .get("high_complexity")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    by_label || by_flag
}

/// Relevance in [1.0, 5.0]
pub fn relevance_score(candidate: &Candidate, domain: Option<&str>) -> f64 {
    let mut score = BASE_SCORE + (candidate.confidence() - CONFIDENCE_PIVOT) * CONFIDENCE_WEIGHT;

    if let Some(domain) = domain.map(|d| d.trim().to_lowercase()) {
        if !domain.is_empty()
            && candidate
                .tags()
                .iter()
                .any(|tag| tag.to_lowercase().contains(&domain))
        {
            score += DOMAIN_BONUS;
        }
    }

    if candidate.rationale_len() > LONG_RATIONALE_CHARS {
        score += LONG_RATIONALE_BONUS;
    }

    if is_high_complexity(candidate) {
        score += COMPLEXITY_BONUS;
    }

    score.clamp(1.0, 5.0)
}

/// Classify and score every candidate, preserving input order
pub fn label(
    candidates: Vec<Candidate>,
    bundle: &InputBundle,
    config: &LabelerConfig,
) -> Vec<EnrichedCandidate> {
    let domain = bundle.domain.as_deref();

    candidates
        .into_iter()
        .map(|candidate| {
            let dimension = classify_dimension(&candidate, config);
            let difficulty = classify_difficulty(&candidate);
            let score = relevance_score(&candidate, domain);
            debug!(
                "Labeled [{} / {} / {:.2}] {}",
                dimension,
                difficulty,
                score,
                candidate.text()
            );
            EnrichedCandidate::new(candidate, dimension, difficulty, score)
        })
        .collect()
}
