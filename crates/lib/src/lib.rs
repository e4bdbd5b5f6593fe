//!
//! Orderly: an ordered key-value register on an append-only causal log.
//! Keys map to values and also hold a position in a user-controlled order, and
//! any number of replicas can write concurrently and converge once their logs
//! are merged.
//!
//! ## Core Concepts
//!
//! * **Entries (`entry::LogEntry`)**: Immutable, content-addressed records. Each entry names its
//!   parents and carries a height, giving the log a deterministic newest-first order.
//! * **Logs (`log::OpLog`)**: The storage boundary. Anything that can append payloads and list
//!   their IDs in causal order can host a register; [`log::InMemoryLog`] is provided.
//! * **Operations (`operation::Operation`)**: `PUT`, `MOVE` and `DELETE` records, the only
//!   payloads a register writes.
//! * **Positions (`position`)**: Fractional `f64` coordinates chosen between neighbours, so an
//!   insert or move never rewrites other keys.
//! * **Resolution (`resolver::Resolver`)**: A newest-first fold of the log where the most recent
//!   `PUT` or `DELETE` decides each key.
//! * **Materialization (`materialize`)**: Sorting resolved entries into the final order.
//! * **The register (`store::OrderedKeyValue`)**: The public API tying all of the above together.

pub mod clock;
pub mod entry;
pub mod height;
pub mod log;
pub mod materialize;
pub mod operation;
pub mod position;
pub mod resolver;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use clock::{Clock, SystemClock};
pub use entry::{ID, LogEntry};
pub use height::HeightStrategy;
pub use log::{InMemoryLog, OpLog};
pub use store::OrderedKeyValue;

/// Result type used throughout the Orderly library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Orderly library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured log errors from the log module
    #[error(transparent)]
    Log(log::LogError),

    /// Structured register errors from the store module
    #[error(transparent)]
    Store(store::StoreError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Log(_) => "log",
            Error::Store(_) => "store",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Log(log_err) => log_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error rejects a key.
    pub fn is_invalid_key(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_invalid_key(),
            _ => false,
        }
    }

    /// Check if this error reports a structurally invalid log entry.
    pub fn is_invalid_entry(&self) -> bool {
        match self {
            Error::Log(log_err) => log_err.is_invalid_entry(),
            _ => false,
        }
    }

    /// Check if the log failed while being read.
    pub fn is_log_read_failure(&self) -> bool {
        match self {
            Error::Log(log_err) => log_err.is_read_failure(),
            _ => false,
        }
    }

    /// Check if the log refused an append.
    pub fn is_log_append_failure(&self) -> bool {
        match self {
            Error::Log(log_err) => log_err.is_append_failure(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Log(log_err) => log_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error is serialization-related.
    pub fn is_serialization_error(&self) -> bool {
        match self {
            Error::Serialize(_) => true,
            Error::Log(log_err) => log_err.is_format_error(),
            Error::Store(store_err) => store_err.is_serialization_error(),
            Error::Io(_) => false,
        }
    }
}
