use super::parse::accept_entries;
use super::{parse_candidates, ProposerTask};
use crate::error::ProposerError;
use crate::model::{Candidate, InputBundle, RawCandidate};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// Serves a fixed candidate list from a YAML or JSON file
pub struct FileProposer {
    pub id: String,
    pub name: String,
    pub path: PathBuf,
    pub timeout: Option<Duration>,
}

#[async_trait]
impl ProposerTask for FileProposer {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn propose(&self, _bundle: &InputBundle) -> Result<Vec<Candidate>, ProposerError> {
        let content = tokio::fs::read_to_string(&self.path).await?;

        let is_yaml = self
            .path
            .extension()
            .map(|ext| ext == "yaml" || ext == "yml")
            .unwrap_or(false);

        if !is_yaml {
            return parse_candidates(&content, &self.id, &self.name);
        }

        let entries: Vec<serde_yaml::Value> = serde_yaml::from_str(&content)
            .map_err(|e| ProposerError::Parse(format!("{}: {}", self.path.display(), e)))?;

        let decoded = entries
            .into_iter()
            .map(|entry| serde_yaml::from_value::<RawCandidate>(entry).map_err(|e| e.to_string()));

        Ok(accept_entries(decoded, &self.id, &self.name))
    }
}
