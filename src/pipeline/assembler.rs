use crate::model::{Difficulty, Dimension, EnrichedCandidate, OutputRecord};

fn focus(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Foundation => "Command of the underlying theory and core concepts",
        Dimension::ResearchMethod => "Soundness of the methodology, data and analysis",
        Dimension::Project => "Ownership of the implementation and its results",
        Dimension::SoftSkill => "Communication, collaboration and self-management",
        Dimension::Reflection => "Awareness of limitations and directions for future work",
    }
}

fn difficulty_guidance(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Basic => "Answer directly with a precise definition or summary.",
        Difficulty::Intermediate => {
            "Walk through the reasoning step by step and back it with a concrete example."
        }
        Difficulty::Killer => {
            "Acknowledge the weakness first, then defend the choice with evidence and name the trade-off."
        }
    }
}

fn guidance(item: &EnrichedCandidate) -> String {
    let mut text = difficulty_guidance(item.difficulty).to_string();
    let tags = item.candidate.tags();
    if !tags.is_empty() {
        text.push_str(&format!(" Touch on: {}.", tags.join(", ")));
    }
    text
}

/// Map approved items 1:1 into output records, ids starting at 1
pub fn assemble(items: Vec<EnrichedCandidate>) -> Vec<OutputRecord> {
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let guidance = guidance(&item);
            let c = &item.candidate;
            OutputRecord {
                id: idx + 1,
                fingerprint: OutputRecord::fingerprint_for(c.source_task_id(), c.text()),
                text: c.text().to_string(),
                rationale: c.rationale().to_string(),
                dimension: item.dimension,
                difficulty: item.difficulty,
                score: item.score,
                source_task_id: c.source_task_id().to_string(),
                source_display_name: c.source_display_name().to_string(),
                tags: c.tags().to_vec(),
                focus: focus(item.dimension).to_string(),
                guidance,
            }
        })
        .collect()
}
