//! JSONL file writer for workflow transitions.
//!
//! Each [`StageObservation`] is serialized as a single JSON line with a
//! `type` field and `timestamp`, appended to the file via a buffered writer.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;
use tutor_application::{StageObservation, WorkflowObserver};

const RECORD_TYPE: &str = "workflow_transition";

/// Workflow observer that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlWorkflowObserver {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlWorkflowObserver {
    /// Open `path` for appending, creating it (and parent directories) if needed.
    ///
    /// Returns `None` if the file cannot be opened; observation is optional.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create observer log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open observer log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(observation: &StageObservation) -> Option<serde_json::Value> {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let serde_json::Value::Object(mut map) = serde_json::to_value(observation).ok()? else {
            return None;
        };
        map.insert(
            "type".to_string(),
            serde_json::Value::String(RECORD_TYPE.to_string()),
        );
        map.insert(
            "timestamp".to_string(),
            serde_json::Value::String(timestamp),
        );
        Some(serde_json::Value::Object(map))
    }
}

impl WorkflowObserver for JsonlWorkflowObserver {
    fn observe(&self, observation: &StageObservation) {
        let Some(record) = Self::record(observation) else {
            warn!("Could not serialize observation for {}", observation.event);
            return;
        };
        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                warn!("Could not serialize observation for {}: {}", observation.event, e);
                return;
            }
        };

        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(_) => {
                warn!("Observer log {} is poisoned; dropping record", self.path.display());
                return;
            }
        };
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            warn!(
                "Failed to write observer log {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

impl Drop for JsonlWorkflowObserver {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock()
            && let Err(e) = writer.flush()
        {
            warn!("Failed to flush observer log {}: {}", self.path.display(), e);
        }
    }
}
