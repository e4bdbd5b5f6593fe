//! Persistence operations for InMemoryLog
//!
//! This module handles serialization and file I/O for saving/loading
//! the in-memory log to/from JSON files.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use super::{InMemoryLog, LogState};
use crate::{
    Error, Result,
    entry::{ID, LogEntry},
    log::LogError,
};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Serializable form of an InMemoryLog.
///
/// Tips are not stored; they are rebuilt from parent links on load.
#[derive(Serialize, Deserialize)]
struct SerializableLog {
    /// File format version for compatibility checking
    #[serde(rename = "_v", default, skip_serializing_if = "is_v0")]
    version: u8,
    /// When the file was written, for humans inspecting it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<String>,
    entries: BTreeMap<ID, LogEntry>,
}

/// Saves every entry of `log` to `path` as pretty-printed JSON.
pub(crate) async fn save_to_file<P: AsRef<Path>>(log: &InMemoryLog, path: P) -> Result<()> {
    let entries: BTreeMap<ID, LogEntry> = log
        .state
        .read()
        .await
        .entries
        .iter()
        .map(|(id, entry)| (id.clone(), entry.clone()))
        .collect();
    let count = entries.len();

    let serializable = SerializableLog {
        version: PERSISTENCE_VERSION,
        saved_at: Some(log.clock().now_rfc3339()),
        entries,
    };

    let json = serde_json::to_string_pretty(&serializable)
        .map_err(|e| -> Error { LogError::SerializationFailed { source: e }.into() })?;
    tokio::fs::write(path.as_ref(), json)
        .await
        .map_err(|e| -> Error { LogError::FileIo { source: e }.into() })?;
    tracing::info!(path = %path.as_ref().display(), entries = count, "Saved log");
    Ok(())
}

/// Loads a log from a JSON file.
///
/// If the file does not exist, a new, empty log is returned. Every entry is
/// validated and checked against the ID it was stored under.
pub(crate) async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemoryLog> {
    let json = match tokio::fs::read_to_string(path.as_ref()).await {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.as_ref().display(), "No log file found, starting empty");
            return Ok(InMemoryLog::new());
        }
        Err(e) => return Err(LogError::FileIo { source: e }.into()),
    };

    let serializable: SerializableLog = serde_json::from_str(&json)
        .map_err(|e| -> Error { LogError::DeserializationFailed { source: e }.into() })?;
    if serializable.version != PERSISTENCE_VERSION {
        return Err(LogError::UnsupportedVersion {
            found: serializable.version,
            supported: PERSISTENCE_VERSION,
        }
        .into());
    }

    let mut state = LogState::default();
    for (id, entry) in serializable.entries {
        entry.validate()?;
        let actual = entry.id();
        if actual != id {
            return Err(LogError::InvalidEntry {
                reason: format!("entry stored as {id} hashes to {actual}"),
            }
            .into());
        }
        state.insert(id, entry);
    }
    tracing::info!(
        path = %path.as_ref().display(),
        entries = state.entries.len(),
        "Loaded log"
    );

    let log = InMemoryLog::new();
    *log.state.write().await = state;
    Ok(log)
}
