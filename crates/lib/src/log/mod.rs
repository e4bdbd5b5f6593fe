//! The causal operation log consumed by the register.
//!
//! This module defines the [`OpLog`] trait, the narrow boundary between the
//! register and whatever append-only, content-addressed log stores its
//! operations. The register only ever appends payloads and walks the log;
//! hashing, persistence and replication belong to the log implementation.
//!
//! [`InMemoryLog`] is the bundled implementation, suitable for tests, the CLI
//! and embedding where the whole log fits in memory.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    Result,
    entry::{ID, LogEntry, RawData},
};

mod errors;
mod in_memory;

pub use errors::LogError;
pub use in_memory::InMemoryLog;

/// The order in which a log naturally lists its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalOrder {
    /// Causally-later entries come first.
    #[default]
    NewestFirst,
    /// Causally-earlier entries come first; readers must reverse the listing.
    OldestFirst,
}

/// An append-only, content-addressed log of operation payloads.
///
/// Implementations must be `Send + Sync`; many resolution passes may read the
/// same log concurrently while writers append to it.
///
/// The listing returned by [`order`](OpLog::order) must be consistent with
/// causality: an entry always appears on the newer side of every entry it
/// follows. Ties between concurrent entries must be broken identically on
/// every replica holding the same set of entries, otherwise replicas will not
/// converge.
#[async_trait]
pub trait OpLog: Send + Sync {
    /// Persist one payload as a new entry following the log's current tips.
    ///
    /// Returns the content address of the new entry.
    async fn append(&self, payload: RawData) -> Result<ID>;

    /// List every entry ID in the log's natural traversal order.
    async fn order(&self) -> Result<Vec<ID>>;

    /// Fetch one entry by ID.
    async fn get(&self, id: &ID) -> Result<LogEntry>;

    /// Direction of the listing returned by [`order`](OpLog::order).
    fn traversal_order(&self) -> TraversalOrder {
        TraversalOrder::NewestFirst
    }
}

/// A single newest-first walk over a log.
///
/// Opening a traversal snapshots the entry listing; entries themselves are
/// fetched one at a time as the walk advances, so a caller that stops early
/// never reads the tail of the log. Every call to [`Traversal::open`] starts a
/// fresh walk.
pub struct Traversal {
    log: Arc<dyn OpLog>,
    ids: std::vec::IntoIter<ID>,
}

impl Traversal {
    /// Snapshot the listing of `log`, reversing it if the log lists
    /// oldest-first.
    pub async fn open(log: Arc<dyn OpLog>) -> Result<Self> {
        let mut ids = log.order().await?;
        if log.traversal_order() == TraversalOrder::OldestFirst {
            ids.reverse();
        }
        Ok(Self {
            log,
            ids: ids.into_iter(),
        })
    }

    /// Number of entries not yet visited.
    pub fn remaining(&self) -> usize {
        self.ids.len()
    }

    /// Fetch the next entry, newest first.
    ///
    /// An entry whose content does not hash to the ID it was listed under is
    /// reported as a read failure.
    pub async fn next(&mut self) -> Result<Option<(ID, LogEntry)>> {
        let Some(id) = self.ids.next() else {
            return Ok(None);
        };
        let entry = self.log.get(&id).await?;
        let actual = entry.id();
        if actual != id {
            return Err(LogError::ReadFailed {
                reason: format!("entry listed as {id} hashes to {actual}"),
            }
            .into());
        }
        Ok(Some((id, entry)))
    }
}
