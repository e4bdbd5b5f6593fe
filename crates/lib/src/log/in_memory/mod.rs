//! In-memory operation log implementation
//!
//! This module provides an in-memory implementation of the [`OpLog`] trait,
//! suitable for testing, the CLI, or embedding where the whole log fits in
//! memory. State can be saved to and loaded from a JSON file.

mod persistence;

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    Result,
    clock::{Clock, SystemClock},
    entry::{ID, LogEntry, RawData},
    height::HeightStrategy,
    log::{LogError, OpLog, TraversalOrder},
};

/// Entries plus the tip bookkeeping needed to pick parents for new appends.
#[derive(Debug, Default)]
pub(crate) struct LogState {
    pub(crate) entries: HashMap<ID, LogEntry>,
    /// Entries that no other known entry lists as a parent.
    tips: HashSet<ID>,
    /// Every ID referenced as a parent, including parents not yet received.
    referenced: HashSet<ID>,
}

impl LogState {
    /// Insert an entry and update tips. Out-of-order arrival is fine: a parent
    /// that shows up after its child is never a tip.
    fn insert(&mut self, id: ID, entry: LogEntry) {
        for parent in entry.parents() {
            self.referenced.insert(parent.clone());
            self.tips.remove(parent);
        }
        if !self.referenced.contains(&id) {
            self.tips.insert(id.clone());
        }
        self.entries.insert(id, entry);
    }
}

/// A simple in-memory log using a `HashMap` for storage.
///
/// Entries are listed newest-first, ordered by descending height and then by
/// descending ID. Two replicas holding the same entries therefore list them
/// identically, whichever order the entries arrived in.
///
/// # Example
///
/// ```
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// use orderly::log::{InMemoryLog, OpLog};
///
/// let log = InMemoryLog::new();
/// let first = log.append("one".to_string()).await.unwrap();
/// let second = log.append("two".to_string()).await.unwrap();
/// assert_eq!(log.order().await.unwrap(), vec![second, first]);
/// # });
/// ```
#[derive(Debug)]
pub struct InMemoryLog {
    pub(crate) state: RwLock<LogState>,
    height_strategy: HeightStrategy,
    clock: Arc<dyn Clock>,
}

impl InMemoryLog {
    /// Creates a new, empty log using incremental heights and the system clock.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LogState::default()),
            height_strategy: HeightStrategy::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `strategy` to compute the height of entries appended from now on.
    pub fn with_height_strategy(mut self, strategy: HeightStrategy) -> Self {
        self.height_strategy = strategy;
        self
    }

    /// Use `clock` for timestamp heights and persistence stamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The height strategy applied to local appends.
    pub fn height_strategy(&self) -> HeightStrategy {
        self.height_strategy
    }

    /// Number of entries in the log.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    /// Returns true if the log holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    /// Current tips in sorted order; these become the parents of the next append.
    pub async fn tips(&self) -> Vec<ID> {
        let mut tips: Vec<ID> = self.state.read().await.tips.iter().cloned().collect();
        tips.sort();
        tips
    }

    /// Insert an entry produced by another replica.
    ///
    /// Importing an entry that is already present is a no-op, so replicas can
    /// exchange entries repeatedly without coordination.
    pub async fn import(&self, entry: LogEntry) -> Result<ID> {
        entry.validate()?;
        let id = entry.id();
        let mut state = self.state.write().await;
        if !state.entries.contains_key(&id) {
            tracing::trace!(entry_id = %id, height = entry.height(), "Importing log entry");
            state.insert(id.clone(), entry);
        }
        Ok(id)
    }

    /// Import every entry held by `other`. Returns the number of entries that
    /// were new to this log.
    pub async fn join(&self, other: &InMemoryLog) -> Result<usize> {
        let incoming: Vec<LogEntry> = other.state.read().await.entries.values().cloned().collect();
        let before = self.len().await;
        for entry in incoming {
            self.import(entry).await?;
        }
        let added = self.len().await - before;
        tracing::debug!(added, "Joined log replica");
        Ok(added)
    }

    /// Saves every entry to `path` as JSON.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads a log from a JSON file written by [`save_to_file`](Self::save_to_file).
    ///
    /// If the file does not exist, a new, empty log is returned.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

impl Default for InMemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OpLog for InMemoryLog {
    async fn append(&self, payload: RawData) -> Result<ID> {
        let mut state = self.state.write().await;
        let parents: Vec<ID> = state.tips.iter().cloned().collect();
        let max_parent_height = parents
            .iter()
            .filter_map(|p| state.entries.get(p))
            .map(LogEntry::height)
            .max();
        let height = self
            .height_strategy
            .calculate_height(max_parent_height, self.clock.as_ref());
        let entry = LogEntry::new(parents, height, payload);
        let id = entry.id();
        if state.entries.contains_key(&id) {
            return Err(LogError::AppendFailed {
                reason: format!("entry {id} already exists"),
            }
            .into());
        }
        state.insert(id.clone(), entry);
        Ok(id)
    }

    async fn order(&self) -> Result<Vec<ID>> {
        let state = self.state.read().await;
        let mut ids: Vec<(u64, &ID)> = state
            .entries
            .iter()
            .map(|(id, entry)| (entry.height(), id))
            .collect();
        ids.sort_unstable_by(|a, b| b.cmp(a));
        Ok(ids.into_iter().map(|(_, id)| id.clone()).collect())
    }

    async fn get(&self, id: &ID) -> Result<LogEntry> {
        let state = self.state.read().await;
        state
            .entries
            .get(id)
            .cloned()
            .ok_or_else(|| LogError::EntryNotFound { id: id.clone() }.into())
    }

    fn traversal_order(&self) -> TraversalOrder {
        TraversalOrder::NewestFirst
    }
}
