//! Log merge resolution.
//!
//! The resolver folds the operation log, newest entry first, into the set of
//! live keys. Because later operations are visited first, the first `PUT` or
//! `DELETE` reached for a key is its most recent one and fixes the key's fate;
//! everything older for that key is ignored. A `MOVE` seen before that point
//! is remembered and applied to the `PUT` once it is reached.
//!
//! Resolution is read-only. Every [`Resolver`] performs its own walk over the
//! log, so any number of them may run concurrently.

use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::{
    Result,
    entry::ID,
    log::{OpLog, Traversal},
    operation::Operation,
};

/// A live key as reconstructed from the log.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveEntry<T> {
    pub key: String,
    pub value: T,
    /// Position from the latest `MOVE`, else from the `PUT` itself.
    /// `None` means the entry sorts after every positioned entry.
    pub position: Option<f64>,
    /// ID of the log entry holding the `PUT` that set `value`.
    pub hash: ID,
    /// Larger for records visited earlier, i.e. causally later.
    pub recency: u64,
}

/// Lazy, newest-first resolution of the live entries of a log.
///
/// Yields each live key once. With a limit, stops after that many live keys;
/// deleted or superseded keys do not count towards it.
pub struct Resolver<T> {
    traversal: Traversal,
    limit: Option<usize>,
    yielded: usize,
    recency: u64,
    /// Keys whose fate is already decided by a newer `PUT` or `DELETE`.
    finalized: HashSet<String>,
    /// Positions from `MOVE`s newer than any `PUT` seen so far for the key.
    pending: HashMap<String, f64>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Resolver<T> {
    /// Start a fresh resolution pass over `log`.
    pub async fn open(log: Arc<dyn OpLog>, limit: Option<usize>) -> Result<Self> {
        let traversal = Traversal::open(log).await?;
        let recency = traversal.remaining() as u64;
        Ok(Self {
            traversal,
            limit,
            yielded: 0,
            recency,
            finalized: HashSet::new(),
            pending: HashMap::new(),
            _marker: PhantomData,
        })
    }

    /// Resolve the next live entry.
    ///
    /// A failed read aborts the pass with the log's error. Records that cannot
    /// be decoded, including `PUT` values that do not deserialize into `T`,
    /// are skipped.
    pub async fn next(&mut self) -> Result<Option<LiveEntry<T>>> {
        if self.limit.is_some_and(|limit| self.yielded >= limit) {
            return Ok(None);
        }

        while let Some((hash, entry)) = self.traversal.next().await? {
            let recency = self.recency;
            self.recency = self.recency.saturating_sub(1);

            let op = match Operation::decode(entry.payload()) {
                Ok(op) => op,
                Err(e) => {
                    tracing::warn!(entry_id = %hash, error = %e, "Skipping malformed record");
                    continue;
                }
            };
            if self.finalized.contains(op.key()) {
                tracing::trace!(entry_id = %hash, op = op.kind(), key = op.key(), "Superseded");
                continue;
            }

            match op {
                Operation::Put {
                    key,
                    value,
                    position,
                } => {
                    let value: T = match serde_json::from_value(value) {
                        Ok(value) => value,
                        Err(e) => {
                            tracing::warn!(
                                entry_id = %hash,
                                key = %key,
                                error = %e,
                                "Skipping record with undecodable value"
                            );
                            continue;
                        }
                    };
                    let position = self.pending.remove(&key).or(position);
                    tracing::trace!(entry_id = %hash, key = %key, ?position, recency, "Live");
                    self.finalized.insert(key.clone());
                    self.yielded += 1;
                    return Ok(Some(LiveEntry {
                        key,
                        value,
                        position,
                        hash,
                        recency,
                    }));
                }
                Operation::Move { key, position } => {
                    self.pending.entry(key).or_insert(position);
                }
                Operation::Delete { key } => {
                    tracing::trace!(entry_id = %hash, key = %key, "Tombstoned");
                    self.pending.remove(&key);
                    self.finalized.insert(key);
                }
            }
        }
        Ok(None)
    }

    /// Drain the remaining live entries.
    pub async fn collect_all(mut self) -> Result<Vec<LiveEntry<T>>> {
        let mut entries = Vec::new();
        while let Some(entry) = self.next().await? {
            entries.push(entry);
        }
        Ok(entries)
    }
}
