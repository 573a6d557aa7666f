use super::{parse_candidates, ProposerTask};
use crate::error::ProposerError;
use crate::model::{Candidate, InputBundle};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Runs an external generator. The bundle is written to stdin as JSON and
/// candidates are parsed from stdout.
pub struct CommandProposer {
    pub id: String,
    pub name: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

#[async_trait]
impl ProposerTask for CommandProposer {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn propose(&self, bundle: &InputBundle) -> Result<Vec<Candidate>, ProposerError> {
        let payload = serde_json::to_vec(bundle)
            .map_err(|e| ProposerError::Failed(format!("failed to encode bundle: {}", e)))?;

        // Use string for PATH lookup if not an absolute/relative path
        let program_str = self.program.to_string_lossy();
        let mut cmd = if program_str.contains('/') || program_str.contains('\\') {
            Command::new(&self.program)
        } else {
            Command::new(program_str.as_ref())
        };

        cmd.args(&self.args)
            .env("POLYPROBE_TASK_ID", &self.id)
            .env("POLYPROBE_MODE", bundle.mode.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A timed-out attempt drops this future; take the child with it
            .kill_on_drop(true);

        let start = std::time::Instant::now();
        let mut child = cmd.spawn()?;

        // Feed stdin while draining stdout and stderr so neither side can
        // stall on a full pipe
        let stdin = child.stdin.take();
        let feed = async move {
            match stdin {
                Some(mut stdin) => {
                    let written = stdin.write_all(&payload).await;
                    // Close stdin so the generator sees EOF
                    drop(stdin);
                    written
                }
                None => Ok(()),
            }
        };

        let (written, output) = tokio::join!(feed, child.wait_with_output());
        if let Err(e) = written {
            // Generators that ignore stdin may exit before reading it
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(e.into());
            }
        }
        let output = output?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();

        if !output.status.success() {
            return Err(ProposerError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        debug!(
            "Proposer {} produced {} bytes in {:?}",
            self.id,
            stdout.len(),
            start.elapsed()
        );

        parse_candidates(&stdout, &self.id, &self.name)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::model::Mode;

    fn proposer(program: &str, args: &[&str]) -> CommandProposer {
        CommandProposer {
            id: "foundation".to_string(),
            name: "Foundation".to_string(),
            program: PathBuf::from(program),
            args: args.iter().map(|s| s.to_string()).collect(),
            timeout: None,
        }
    }

    #[tokio::test]
    async fn test_command_output_is_parsed() {
        let script = r#"cat > /dev/null; echo '{"candidates": [{"text": "Define the central construct of your study.", "rationale": "Checks conceptual grounding of the work.", "confidence": 0.9}]}'"#;
        let p = proposer("sh", &["-c", script]);

        let candidates = p
            .propose(&InputBundle::new("corpus", Mode::Quick))
            .await
            .unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].source_task_id(), "foundation");
        assert_eq!(candidates[0].confidence(), 0.9);
    }

    #[tokio::test]
    async fn test_command_receives_bundle_on_stdin() {
        // Echo the corpus back as the candidate text
        let script = r#"corpus=$(cat | sed 's/.*"corpus":"\([^"]*\)".*/\1/'); printf '[{"text": "%s", "rationale": "Echoed from the bundle on stdin."}]' "$corpus""#;
        let p = proposer("sh", &["-c", script]);

        let candidates = p
            .propose(&InputBundle::new("How was the cohort recruited?", Mode::Standard))
            .await
            .unwrap();

        assert_eq!(candidates[0].text(), "How was the cohort recruited?");
    }

    #[tokio::test]
    async fn test_chatty_generator_with_large_corpus_completes() {
        // Fills the stderr pipe before it starts reading stdin
        let script = "head -c 200000 /dev/zero >&2; cat > /dev/null; echo '[]'";
        let p = proposer("sh", &["-c", script]);
        let bundle = InputBundle::new("x".repeat(1_000_000), Mode::Quick);

        let candidates = tokio::time::timeout(Duration::from_secs(10), p.propose(&bundle))
            .await
            .expect("generator stalled on a full pipe")
            .unwrap();

        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        let p = proposer("sh", &["-c", "cat > /dev/null; echo boom >&2; exit 3"]);

        let err = p
            .propose(&InputBundle::new("corpus", Mode::Quick))
            .await
            .unwrap_err();

        match err {
            ProposerError::NonZeroExit { code, stderr } => {
                assert_eq!(code, 3);
                assert!(stderr.contains("boom"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
