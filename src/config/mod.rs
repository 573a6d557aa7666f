mod defaults;
mod types;

pub use types::*;

use crate::error::ConfigError;
use crate::model::Mode;
use defaults::*;
use std::collections::HashSet;
use std::path::Path;

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            timeout_sec: default_timeout_sec(),
            concurrency: default_concurrency(),
            launch_delay_ms: default_launch_delay_ms(),
            run_deadline_sec: None,
            retry: RetryConfig::default(),
            cost_per_call: 0.0,
            report_dir: default_report_dir(),
            debug_dir: None,
            quality: QualityConfig::default(),
            labeler: LabelerConfig::default(),
            gatekeeper: GatekeeperConfig::default(),
            modes: ModesConfig::default(),
            proposers: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Validate the config
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Proposer ids key the result map, so they must be unique
        let mut seen = HashSet::new();
        for proposer in &self.proposers {
            if !seen.insert(proposer.id.as_str()) {
                return Err(ConfigError::DuplicateProposer(proposer.id.clone()));
            }
        }

        let enabled_count = self.proposers.iter().filter(|p| p.enabled).count();
        if enabled_count == 0 {
            return Err(ConfigError::NoProposersEnabled);
        }

        for mode in [Mode::Quick, Mode::Standard, Mode::Comprehensive] {
            self.modes
                .for_mode(mode)
                .check()
                .map_err(|reason| ConfigError::InvalidConstraints {
                    mode: mode.to_string(),
                    reason,
                })?;
        }

        Ok(())
    }

    pub fn constraints(&self, mode: Mode) -> &SelectionConstraints {
        self.modes.for_mode(mode)
    }
}

impl SelectionConstraints {
    /// Reject constraint sets that no selection could satisfy
    pub fn check(&self) -> Result<(), String> {
        if self.min_count > self.max_count {
            return Err(format!(
                "min_count {} exceeds max_count {}",
                self.min_count, self.max_count
            ));
        }

        let required: usize = self.dimension_minimums.values().sum();
        if required > self.max_count {
            return Err(format!(
                "dimension minimums sum to {} which exceeds max_count {}",
                required, self.max_count
            ));
        }

        let mut ratio_sum = 0.0;
        for (difficulty, ratio) in &self.difficulty_ratios {
            if !ratio.is_finite() || *ratio < 0.0 {
                return Err(format!("ratio for {} must be a non-negative number", difficulty));
            }
            ratio_sum += ratio;
        }
        if ratio_sum > 1.0 + 1e-9 {
            return Err(format!("difficulty ratios sum to {:.2}, above 1.0", ratio_sum));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dimension;

    const SAMPLE: &str = r#"
timeout_sec: 30
retry:
  max_attempts: 2
modes:
  quick:
    target_count: 5
    min_count: 4
    max_count: 6
    dimension_minimums:
      foundation: 2
    difficulty_ratios:
      basic: 0.4
      killer: 0.2
proposers:
  - id: foundation
    name: Foundation
    kind: command
    program: question-gen
    args: ["--role", "foundation"]
  - id: project
    name: Project
    kind: file
    path: candidates/project.yaml
    timeout_sec: 10
"#;

    #[test]
    fn test_parse_sample_config() {
        let config: Config = serde_yaml::from_str(SAMPLE).unwrap();

        assert_eq!(config.timeout_sec, 30);
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.backoff_base_ms, 1000);
        assert_eq!(config.proposers.len(), 2);
        assert!(matches!(
            config.proposers[0].kind,
            ProposerKind::Command { ref args, .. } if args.len() == 2
        ));
        assert_eq!(config.proposers[1].timeout_sec, Some(10));
        assert_eq!(config.modes.quick.target_count, 5);
        assert_eq!(
            config.modes.quick.dimension_minimums.get(&Dimension::Foundation),
            Some(&2)
        );
        // Unspecified modes keep their defaults
        assert_eq!(config.modes.standard.target_count, 15);
        config.validate().unwrap();
    }

    #[test]
    fn test_default_constraints_are_consistent() {
        let modes = ModesConfig::default();
        for mode in [Mode::Quick, Mode::Standard, Mode::Comprehensive] {
            modes.for_mode(mode).check().unwrap();
        }
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut config: Config = serde_yaml::from_str(SAMPLE).unwrap();
        config.proposers[1].id = "foundation".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateProposer(id)) if id == "foundation"
        ));
    }

    #[test]
    fn test_validate_requires_enabled_proposer() {
        let mut config: Config = serde_yaml::from_str(SAMPLE).unwrap();
        for p in &mut config.proposers {
            p.enabled = false;
        }
        assert!(matches!(config.validate(), Err(ConfigError::NoProposersEnabled)));
    }

    #[test]
    fn test_check_rejects_conflicting_minimums() {
        let mut constraints = default_quick_constraints();
        constraints.dimension_minimums.insert(Dimension::Reflection, 10);
        assert!(constraints.check().is_err());

        let mut constraints = default_quick_constraints();
        constraints.min_count = 20;
        assert!(constraints.check().is_err());
    }
}
