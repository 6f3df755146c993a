//! Actuator mode write path.
//!
//! Mode toggles are fire-and-forget: the sink reports success or failure
//! of the single write and implements no retries or acknowledgment.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

/// Pushes actuator mode changes toward the backend.
pub trait ControlSink: Send {
    /// Request automatic (true) or manual (false) actuator mode.
    fn set_auto_mode(&mut self, enabled: bool) -> Result<()>;
}

#[derive(Serialize)]
struct ControlState {
    #[serde(rename = "autoMode")]
    auto_mode: bool,
}

/// Control sink that writes the requested mode to a JSON file, for
/// bridges that mirror the file back to the live backend.
#[derive(Debug)]
pub struct FileControlSink {
    path: PathBuf,
}

impl FileControlSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ControlSink for FileControlSink {
    fn set_auto_mode(&mut self, enabled: bool) -> Result<()> {
        let json = serde_json::to_string_pretty(&ControlState { auto_mode: enabled })?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        debug!(enabled, "requested actuator mode change");
        Ok(())
    }
}

/// Control sink that discards writes; used when no write path is wired.
#[derive(Debug, Default)]
pub struct NoopControlSink;

impl ControlSink for NoopControlSink {
    fn set_auto_mode(&mut self, _enabled: bool) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_sink_writes_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("control.json");

        let mut sink = FileControlSink::new(&path);
        sink.set_auto_mode(true).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["autoMode"], serde_json::json!(true));

        sink.set_auto_mode(false).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["autoMode"], serde_json::json!(false));
    }

    #[test]
    fn test_noop_sink() {
        let mut sink = NoopControlSink;
        assert!(sink.set_auto_mode(true).is_ok());
    }
}
