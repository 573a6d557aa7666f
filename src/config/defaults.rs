use super::SelectionConstraints;
use crate::model::{Difficulty, Dimension};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

pub fn default_version() -> u32 {
    1
}

pub fn default_timeout_sec() -> u64 {
    45
}

pub fn default_concurrency() -> usize {
    6
}

pub fn default_launch_delay_ms() -> u64 {
    0
}

pub fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

pub fn default_max_attempts() -> u32 {
    3
}

pub fn default_backoff_base_ms() -> u64 {
    1000
}

pub fn default_min_confidence() -> f64 {
    0.6
}

pub fn default_min_text_chars() -> usize {
    15
}

pub fn default_min_rationale_chars() -> usize {
    20
}

pub fn default_source_dimensions() -> HashMap<String, Dimension> {
    [
        ("foundation", Dimension::Foundation),
        ("research_method", Dimension::ResearchMethod),
        ("project", Dimension::Project),
        ("soft_skill", Dimension::SoftSkill),
        ("reflection", Dimension::Reflection),
        ("challenger", Dimension::Project),
    ]
    .into_iter()
    .map(|(id, dim)| (id.to_string(), dim))
    .collect()
}

pub fn default_fallback_dimension() -> Dimension {
    Dimension::Project
}

pub fn default_disallowed_tokens() -> Vec<String> {
    ["stupid", "idiot", "moron", "shut up", "worthless"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn default_trick_tokens() -> Vec<String> {
    [
        "trick question",
        "gotcha",
        "riddle",
        "guess what",
        "just guess",
        "take a guess",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn default_gatekeeper_min_score() -> f64 {
    2.0
}

fn difficulty_ratios(basic: f64, intermediate: f64, killer: f64) -> BTreeMap<Difficulty, f64> {
    BTreeMap::from([
        (Difficulty::Basic, basic),
        (Difficulty::Intermediate, intermediate),
        (Difficulty::Killer, killer),
    ])
}

pub fn default_quick_constraints() -> SelectionConstraints {
    SelectionConstraints {
        target_count: 10,
        min_count: 8,
        max_count: 12,
        dimension_minimums: BTreeMap::from([
            (Dimension::Foundation, 2),
            (Dimension::ResearchMethod, 2),
            (Dimension::Project, 2),
        ]),
        difficulty_ratios: difficulty_ratios(0.3, 0.5, 0.2),
    }
}

pub fn default_standard_constraints() -> SelectionConstraints {
    SelectionConstraints {
        target_count: 15,
        min_count: 12,
        max_count: 18,
        dimension_minimums: BTreeMap::from([
            (Dimension::Foundation, 3),
            (Dimension::ResearchMethod, 3),
            (Dimension::Project, 3),
            (Dimension::SoftSkill, 1),
            (Dimension::Reflection, 1),
        ]),
        difficulty_ratios: difficulty_ratios(0.3, 0.5, 0.2),
    }
}

pub fn default_comprehensive_constraints() -> SelectionConstraints {
    SelectionConstraints {
        target_count: 20,
        min_count: 16,
        max_count: 25,
        dimension_minimums: BTreeMap::from([
            (Dimension::Foundation, 4),
            (Dimension::ResearchMethod, 4),
            (Dimension::Project, 4),
            (Dimension::SoftSkill, 2),
            (Dimension::Reflection, 2),
        ]),
        difficulty_ratios: difficulty_ratios(0.25, 0.5, 0.25),
    }
}

pub fn default_true() -> bool {
    true
}
