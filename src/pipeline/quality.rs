use crate::config::QualityConfig;
use crate::model::Candidate;
use tracing::debug;

/// Order-preserving threshold filter
pub fn filter(candidates: Vec<Candidate>, config: &QualityConfig) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(|c| match rejection_reason(c, config) {
            Some(reason) => {
                debug!("Quality: dropping '{}' ({})", c.text(), reason);
                false
            }
            None => true,
        })
        .collect()
}

fn rejection_reason(c: &Candidate, config: &QualityConfig) -> Option<String> {
    if c.confidence() < config.min_confidence {
        return Some(format!(
            "confidence {:.2} < {:.2}",
            c.confidence(),
            config.min_confidence
        ));
    }
    if c.text_len() < config.min_text_chars {
        return Some(format!(
            "text {} chars < {}",
            c.text_len(),
            config.min_text_chars
        ));
    }
    if c.rationale_len() < config.min_rationale_chars {
        return Some(format!(
            "rationale {} chars < {}",
            c.rationale_len(),
            config.min_rationale_chars
        ));
    }
    None
}
