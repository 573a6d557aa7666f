//! Near-duplicate removal by character overlap.
//!
//! The similarity is a cheap proxy, not an edit distance: two texts that
//! share an alphabet but differ in meaning can score high.

use crate::model::Candidate;
use std::collections::HashSet;
use tracing::debug;

pub const SIMILARITY_THRESHOLD: f64 = 0.6;

/// Share of `a`'s characters that also occur somewhere in `b`, over the
/// longer length
fn overlap(a: &[char], b: &[char], b_set: &HashSet<char>) -> f64 {
    let denom = a.len().max(b.len());
    if denom == 0 {
        return 0.0;
    }
    let shared = a.iter().filter(|c| b_set.contains(c)).count();
    shared as f64 / denom as f64
}

/// Symmetric similarity in [0, 1]: the larger of the two overlap directions
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let a_set: HashSet<char> = a.iter().copied().collect();
    let b_set: HashSet<char> = b.iter().copied().collect();
    overlap(&a, &b, &b_set).max(overlap(&b, &a, &a_set))
}

/// Pairwise greedy merge. The lower-confidence member of each similar pair
/// is removed (the later one on ties); removed candidates take no further
/// part. Survivors keep their relative order.
pub fn dedupe(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let n = candidates.len();
    let mut removed = vec![false; n];

    for i in 0..n {
        if removed[i] {
            continue;
        }
        for j in (i + 1)..n {
            if removed[j] {
                continue;
            }
            let sim = similarity(candidates[i].text(), candidates[j].text());
            if sim <= SIMILARITY_THRESHOLD {
                continue;
            }

            if candidates[j].confidence() > candidates[i].confidence() {
                debug!(
                    "Dedupe: dropping #{} (similarity {:.2} with #{}, lower confidence)",
                    i, sim, j
                );
                removed[i] = true;
                break;
            }

            debug!(
                "Dedupe: dropping #{} (similarity {:.2} with #{}, lower or equal confidence)",
                j, sim, i
            );
            removed[j] = true;
        }
    }

    candidates
        .into_iter()
        .zip(removed)
        .filter_map(|(c, gone)| (!gone).then_some(c))
        .collect()
}
