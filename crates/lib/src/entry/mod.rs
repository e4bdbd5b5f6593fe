//!
//! Defines the fundamental unit of the operation log (`LogEntry`) and its `ID`.
//!
//! A `LogEntry` is immutable and content-addressable: its `ID` is a SHA-256
//! hash over its parents, height and payload. Entries form a Merkle-DAG
//! through their parent references, and the height embedded in every entry
//! orders that DAG causally.

pub mod id;

pub use id::ID;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Result, log::LogError};

/// Domain separator mixed into every entry hash.
const ENTRY_DOMAIN: &[u8] = b"orderly:entry:v0";

/// Represents serialized data, typically JSON, provided by the layer above the log.
///
/// The log never interprets payloads; that is left to the resolver.
pub type RawData = String;

/// One immutable record of the causal log.
///
/// # Example
///
/// ```
/// use orderly::entry::LogEntry;
///
/// let first = LogEntry::new(vec![], 0, r#"{"op":"DELETE","key":"a"}"#);
/// let second = LogEntry::new(vec![first.id()], 1, r#"{"op":"DELETE","key":"b"}"#);
/// assert_ne!(first.id(), second.id());
/// assert_eq!(second.parents(), &[first.id()]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    /// IDs of the entries this one causally follows, sorted and deduplicated.
    parents: Vec<ID>,
    /// Causal height: strictly greater than the height of every parent.
    height: u64,
    /// Opaque payload written by the operation encoder.
    payload: RawData,
}

impl LogEntry {
    /// Create an entry. Parents are sorted and deduplicated so that the same
    /// logical entry always hashes to the same `ID`.
    pub fn new(mut parents: Vec<ID>, height: u64, payload: impl Into<RawData>) -> Self {
        parents.sort();
        parents.dedup();
        Self {
            parents,
            height,
            payload: payload.into(),
        }
    }

    /// Get the content-addressable ID of the entry.
    ///
    /// Every variable-length field is length-prefixed so that distinct entries
    /// can never produce the same byte stream.
    pub fn id(&self) -> ID {
        let mut hasher = Sha256::new();
        hasher.update(ENTRY_DOMAIN);
        hasher.update(self.height.to_le_bytes());
        hasher.update((self.parents.len() as u64).to_le_bytes());
        for parent in &self.parents {
            hasher.update((parent.as_str().len() as u64).to_le_bytes());
            hasher.update(parent.as_str().as_bytes());
        }
        hasher.update((self.payload.len() as u64).to_le_bytes());
        hasher.update(self.payload.as_bytes());
        ID::from_digest(hasher)
    }

    /// IDs of the parent entries, in sorted order.
    pub fn parents(&self) -> &[ID] {
        &self.parents
    }

    /// The causal height of this entry.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// The opaque payload.
    pub fn payload(&self) -> &RawData {
        &self.payload
    }

    /// Check structural invariants of an entry received from elsewhere.
    ///
    /// Entries built through [`LogEntry::new`] always pass; entries that were
    /// deserialized may not.
    pub fn validate(&self) -> Result<()> {
        if self.parents.iter().any(|p| p.is_empty()) {
            return Err(LogError::InvalidEntry {
                reason: "entry has an empty parent ID".to_string(),
            }
            .into());
        }
        if self.parents.windows(2).any(|w| w[0] >= w[1]) {
            return Err(LogError::InvalidEntry {
                reason: "entry parents are not sorted and unique".to_string(),
            }
            .into());
        }
        if !self.parents.is_empty() && self.height == 0 {
            return Err(LogError::InvalidEntry {
                reason: "entry with parents cannot have height 0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
