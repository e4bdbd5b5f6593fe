//! Error types for register operations.

use thiserror::Error;

/// Errors raised by [`OrderedKeyValue`](super::OrderedKeyValue) before
/// anything reaches the log.
///
/// Absence of a key is not an error; reads return `Option` instead.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key cannot be stored.
    #[error("Invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// The caller's value could not be encoded into an operation record.
    #[error("Serialization failed for key '{key}': {reason}")]
    SerializationFailed { key: String, reason: String },
}

impl StoreError {
    /// Check if this error rejects a key.
    pub fn is_invalid_key(&self) -> bool {
        matches!(self, StoreError::InvalidKey { .. })
    }

    /// Check if this error is related to serialization
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, StoreError::SerializationFailed { .. })
    }

    /// The key the failed operation targeted.
    pub fn key(&self) -> &str {
        match self {
            StoreError::InvalidKey { key, .. } | StoreError::SerializationFailed { key, .. } => key,
        }
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
