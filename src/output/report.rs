use crate::error::OutputError;
use crate::model::{Difficulty, InputBundle, OutputRecord};
use std::fs;
use std::path::Path;

/// Write the final list as `questions.md` and `questions.json`
pub fn write_questions(
    report_dir: &Path,
    records: &[OutputRecord],
    bundle: &InputBundle,
) -> Result<(), OutputError> {
    fs::create_dir_all(report_dir).map_err(OutputError::CreateDir)?;

    let json_path = report_dir.join("questions.json");
    let json = serde_json::to_string_pretty(records)?;
    fs::write(&json_path, json).map_err(OutputError::WriteReport)?;

    let md_path = report_dir.join("questions.md");
    fs::write(&md_path, build_markdown(records, bundle)).map_err(OutputError::WriteReport)?;

    Ok(())
}

fn build_markdown(records: &[OutputRecord], bundle: &InputBundle) -> String {
    let mut content = String::new();

    content.push_str("# Questions\n\n");

    content.push_str("| Metric | Value |\n");
    content.push_str("|--------|-------|\n");
    content.push_str(&format!("| Mode | {} |\n", bundle.mode));
    if let Some(domain) = &bundle.domain {
        content.push_str(&format!("| Domain | {} |\n", domain));
    }
    content.push_str(&format!("| Questions | {} |\n", records.len()));
    content.push_str("\n---\n\n");

    if records.is_empty() {
        content.push_str("*No questions survived the pipeline*\n");
        return content;
    }

    for record in records {
        content.push_str(&format!(
            "### {}. {} {}\n\n",
            record.id,
            difficulty_icon(record.difficulty),
            record.text
        ));
        content.push_str(&format!(
            "- **Dimension:** `{}` | **Difficulty:** `{}` | **Score:** {:.2}\n",
            record.dimension, record.difficulty, record.score
        ));
        content.push_str(&format!(
            "- **Source:** {} (`{}`)\n",
            record.source_display_name, record.source_task_id
        ));
        if !record.tags.is_empty() {
            content.push_str(&format!("- **Tags:** {}\n", record.tags.join(", ")));
        }
        content.push('\n');
        content.push_str(&format!("**Why it is asked:** {}\n\n", record.rationale));
        content.push_str(&format!("**Focus:** {}\n\n", record.focus));
        content.push_str(&format!("**Guidance:** {}\n\n", record.guidance));
        content.push_str("---\n\n");
    }

    content
}

fn difficulty_icon(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Basic => "🟢",
        Difficulty::Intermediate => "🟡",
        Difficulty::Killer => "🔴",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dimension, Mode};
    use tempfile::TempDir;

    fn record() -> OutputRecord {
        OutputRecord {
            id: 1,
            fingerprint: OutputRecord::fingerprint_for("project", "Why this architecture?"),
            text: "Why this architecture?".to_string(),
            rationale: "Checks ownership of design decisions.".to_string(),
            dimension: Dimension::Project,
            difficulty: Difficulty::Killer,
            score: 4.25,
            source_task_id: "project".to_string(),
            source_display_name: "Project".to_string(),
            tags: vec!["architecture".to_string()],
            focus: "Ownership".to_string(),
            guidance: "Defend the trade-off.".to_string(),
        }
    }

    #[test]
    fn test_writes_both_files() {
        let dir = TempDir::new().unwrap();
        let bundle = InputBundle::new("corpus", Mode::Quick).with_domain("robotics");

        write_questions(dir.path(), &[record()], &bundle).unwrap();

        let json = fs::read_to_string(dir.path().join("questions.json")).unwrap();
        let parsed: Vec<OutputRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![record()]);

        let md = fs::read_to_string(dir.path().join("questions.md")).unwrap();
        assert!(md.contains("### 1. 🔴 Why this architecture?"));
        assert!(md.contains("| Domain | robotics |"));
        assert!(md.contains("**Score:** 4.25"));
    }

    #[test]
    fn test_empty_list() {
        let dir = TempDir::new().unwrap();
        let bundle = InputBundle::new("corpus", Mode::Standard);

        write_questions(dir.path(), &[], &bundle).unwrap();

        let md = fs::read_to_string(dir.path().join("questions.md")).unwrap();
        assert!(md.contains("*No questions survived the pipeline*"));
        let json = fs::read_to_string(dir.path().join("questions.json")).unwrap();
        assert_eq!(json.trim(), "[]");
    }
}
