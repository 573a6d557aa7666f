use crate::error::ProposerError;
use crate::model::{Candidate, RawCandidate};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Parse candidates from generator output.
///
/// Accepts a `{"result": "..."}` wrapper, fenced code blocks, a
/// `{"candidates": [...]}` object, or a bare array. Each entry is decoded
/// and validated on its own; bad ones are dropped and the rest kept in
/// order.
pub fn parse_candidates(
    raw: &str,
    task_id: &str,
    display_name: &str,
) -> Result<Vec<Candidate>, ProposerError> {
    let entries = try_parse_entries(raw).ok_or_else(|| {
        ProposerError::Parse(format!("no candidate JSON found in output of {}", task_id))
    })?;

    let decoded = entries
        .into_iter()
        .map(|entry| serde_json::from_value::<RawCandidate>(entry).map_err(|e| e.to_string()));

    Ok(accept_entries(decoded, task_id, display_name))
}

/// Validate decoded entries, dropping the ones that fail either step
pub(super) fn accept_entries<I>(entries: I, task_id: &str, display_name: &str) -> Vec<Candidate>
where
    I: IntoIterator<Item = Result<RawCandidate, String>>,
{
    let mut total = 0;
    let candidates: Vec<Candidate> = entries
        .into_iter()
        .filter_map(|entry| {
            total += 1;
            let raw = match entry {
                Ok(raw) => raw,
                Err(e) => {
                    debug!("Malformed candidate from {}: {}", task_id, e);
                    return None;
                }
            };
            match raw.into_candidate(task_id, display_name) {
                Ok(c) => Some(c),
                Err(e) => {
                    debug!("Rejected candidate from {}: {}", task_id, e);
                    None
                }
            }
        })
        .collect();

    if candidates.len() < total {
        debug!(
            "Proposer {} kept {} of {} candidates",
            task_id,
            candidates.len(),
            total
        );
    }

    candidates
}

fn try_parse_entries(raw: &str) -> Option<Vec<Value>> {
    // Claude wraps result in {"result": "...", ...} JSON
    #[derive(Deserialize)]
    struct ClaudeOutput {
        result: String,
    }

    if let Ok(claude_out) = serde_json::from_str::<ClaudeOutput>(raw) {
        if let Some(entries) = parse_entries_json(&claude_out.result) {
            return Some(entries);
        }
    }

    parse_entries_json(raw)
}

fn parse_entries_json(s: &str) -> Option<Vec<Value>> {
    let json_str = extract_json(s)?;

    // Entries stay untyped here so one bad item cannot sink the batch
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape {
        Wrapped {
            #[serde(alias = "questions")]
            candidates: Vec<Value>,
        },
        Bare(Vec<Value>),
    }

    match serde_json::from_str::<Shape>(&json_str) {
        Ok(Shape::Wrapped { candidates }) | Ok(Shape::Bare(candidates)) => Some(candidates),
        Err(e) => {
            debug!("Failed to parse candidates JSON: {}", e);
            None
        }
    }
}

/// Extract a JSON object or array from a string that might contain
/// markdown code blocks or surrounding prose
fn extract_json(s: &str) -> Option<String> {
    let trimmed = s.trim();

    // First try: the whole string is valid JSON
    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
    {
        return Some(trimmed.to_string());
    }

    // Second try: extract from markdown code block
    let re = regex::Regex::new(r"```(?:json)?\s*\n?([\s\S]*?)\n?```").ok()?;
    for cap in re.captures_iter(s) {
        let potential_json = cap.get(1)?.as_str().trim();
        if serde_json::from_str::<serde_json::Value>(potential_json).is_ok() {
            return Some(potential_json.to_string());
        }
    }

    // Third try: first balanced object or array in the text
    let start = s.find(['{', '['])?;
    let (open, close) = if s[start..].starts_with('{') {
        ('{', '}')
    } else {
        ('[', ']')
    };

    let mut depth = 0;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in s[start..].char_indices() {
        if in_string {
            match c {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => in_string = false,
                _ => escaped = false,
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    let candidate = &s[start..start + i + c.len_utf8()];
                    if serde_json::from_str::<serde_json::Value>(candidate).is_ok() {
                        return Some(candidate.to_string());
                    }
                    return None;
                }
            }
            _ => {}
        }
    }

    None
}
