//! Error types for the operation log boundary.
//!
//! Failures of the underlying log are surfaced to the caller unchanged; the
//! resolver never papers over a failed read with a partial view.

use thiserror::Error;

use crate::entry::ID;

/// Errors that can occur while appending to or reading from a log.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LogError {
    /// Entry not found by ID.
    #[error("Entry not found: {id}")]
    EntryNotFound {
        /// The ID of the entry that was not found
        id: ID,
    },

    /// The log refused or failed to persist a new record.
    #[error("Log append failed: {reason}")]
    AppendFailed {
        /// Description of the failure reported by the log
        reason: String,
    },

    /// The log failed while being traversed.
    #[error("Log read failed: {reason}")]
    ReadFailed {
        /// Description of the failure reported by the log
        reason: String,
    },

    /// An entry violates structural invariants.
    #[error("Invalid log entry: {reason}")]
    InvalidEntry {
        /// Why the entry was rejected
        reason: String,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A persisted log was written in a format this build does not read.
    #[error("Unsupported log file version {found}; only version {supported} is supported")]
    UnsupportedVersion {
        /// Version found in the file
        found: u8,
        /// Version this build understands
        supported: u8,
    },
}

impl LogError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LogError::EntryNotFound { .. })
    }

    /// Check if this error was raised while appending.
    pub fn is_append_failure(&self) -> bool {
        matches!(self, LogError::AppendFailed { .. })
    }

    /// Check if this error was raised while reading, including entries that
    /// disappeared between listing and fetching.
    pub fn is_read_failure(&self) -> bool {
        matches!(
            self,
            LogError::ReadFailed { .. } | LogError::EntryNotFound { .. }
        )
    }

    /// Check if this error indicates a rejected entry.
    pub fn is_invalid_entry(&self) -> bool {
        matches!(self, LogError::InvalidEntry { .. })
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, LogError::FileIo { .. })
    }

    /// Check if this error is related to (de)serialization or file format.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            LogError::SerializationFailed { .. }
                | LogError::DeserializationFailed { .. }
                | LogError::UnsupportedVersion { .. }
        )
    }
}

impl From<LogError> for crate::Error {
    fn from(err: LogError) -> Self {
        crate::Error::Log(err)
    }
}
