//! Operation records written to the log by the register.
//!
//! Every call to `put`, `move` or `delete` becomes exactly one [`Operation`],
//! serialized as a JSON payload and appended to the log. Records are never
//! rewritten; later records supersede earlier ones during resolution.

use serde::{Deserialize, Serialize};

use crate::entry::RawData;

/// One register operation as stored in a log payload.
///
/// The JSON shape is internally tagged by `op`:
///
/// ```json
/// {"op":"PUT","key":"k1","value":"v1","position":0.42}
/// {"op":"MOVE","key":"k1","position":1.7}
/// {"op":"DELETE","key":"k1"}
/// ```
///
/// A `PUT` without `position` sorts after every positioned entry when the
/// register is materialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "UPPERCASE")]
pub enum Operation {
    /// Set the value (and usually the position) of a key, reviving it if deleted.
    Put {
        key: String,
        value: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<f64>,
    },
    /// Reposition a live key without touching its value.
    Move { key: String, position: f64 },
    /// Tombstone a key.
    #[serde(alias = "DEL")]
    Delete { key: String },
}

impl Operation {
    /// The key this operation targets.
    pub fn key(&self) -> &str {
        match self {
            Operation::Put { key, .. } | Operation::Move { key, .. } | Operation::Delete { key } => {
                key
            }
        }
    }

    /// Short name of the operation kind, as written in the `op` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Put { .. } => "PUT",
            Operation::Move { .. } => "MOVE",
            Operation::Delete { .. } => "DELETE",
        }
    }

    /// Serialize into a log payload.
    pub fn encode(&self) -> serde_json::Result<RawData> {
        serde_json::to_string(self)
    }

    /// Parse a log payload.
    ///
    /// Fails for payloads that are not JSON, carry an unknown `op`, are missing
    /// required fields, or name an empty key. Callers treat such records as
    /// written by a peer this replica does not understand and skip them.
    pub fn decode(payload: &str) -> serde_json::Result<Self> {
        let op: Operation = serde_json::from_str(payload)?;
        if op.key().is_empty() {
            return Err(<serde_json::Error as serde::de::Error>::custom(
                "operation has an empty key",
            ));
        }
        Ok(op)
    }
}
