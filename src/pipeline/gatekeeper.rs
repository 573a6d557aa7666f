use crate::config::GatekeeperConfig;
use crate::model::EnrichedCandidate;
use std::fmt;
use tracing::{debug, info};

/// Why an item was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    Disallowed(String),
    Trick(String),
    LowScore(f64),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Disallowed(token) => write!(f, "disallowed wording '{}'", token),
            Rejection::Trick(token) => write!(f, "trick phrasing '{}'", token),
            Rejection::LowScore(score) => write!(f, "score {:.2} below floor", score),
        }
    }
}

/// First failing rule, in order: disallowed, trick, score floor
pub fn check(item: &EnrichedCandidate, config: &GatekeeperConfig) -> Option<Rejection> {
    let text = item.text().to_lowercase();

    if let Some(token) = find_token(&text, &config.disallowed_tokens) {
        return Some(Rejection::Disallowed(token));
    }
    if let Some(token) = find_token(&text, &config.trick_tokens) {
        return Some(Rejection::Trick(token));
    }
    if item.score < config.min_score {
        return Some(Rejection::LowScore(item.score));
    }
    None
}

fn find_token(text: &str, tokens: &[String]) -> Option<String> {
    tokens
        .iter()
        .find(|t| !t.is_empty() && text.contains(&t.to_lowercase()))
        .cloned()
}

/// Drop rejected items. Survivors keep their order and nothing is backfilled.
pub fn review(items: Vec<EnrichedCandidate>, config: &GatekeeperConfig) -> Vec<EnrichedCandidate> {
    let before = items.len();

    let kept: Vec<EnrichedCandidate> = items
        .into_iter()
        .filter(|item| match check(item, config) {
            Some(reason) => {
                debug!("Gatekeeper: rejected '{}' ({})", item.text(), reason);
                false
            }
            None => true,
        })
        .collect();

    info!("Gatekeeper kept {} of {} items", kept.len(), before);
    kept
}
