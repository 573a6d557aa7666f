use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Best-effort receiver for intermediate pipeline state.
/// Implementations must never fail the run.
pub trait DebugSink: Send + Sync {
    fn dump(&self, stage: &str, payload: &Value);
}

/// Logs each dump at debug level
pub struct TracingSink;

impl DebugSink for TracingSink {
    fn dump(&self, stage: &str, payload: &Value) {
        debug!("[{}] {}", stage, payload);
    }
}

/// Writes `<stage>.json` into a directory
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn write(&self, stage: &str, payload: &Value) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.json", stage));
        let json = serde_json::to_string_pretty(payload)?;
        fs::write(&path, json)?;
        Ok(path)
    }
}

impl DebugSink for DirSink {
    fn dump(&self, stage: &str, payload: &Value) {
        match self.write(stage, payload) {
            Ok(path) => debug!("Wrote debug dump {}", path.display()),
            Err(e) => warn!("Could not write debug dump '{}': {}", stage, e),
        }
    }
}
