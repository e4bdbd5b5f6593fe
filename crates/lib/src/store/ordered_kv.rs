use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    Result,
    entry::ID,
    log::{OpLog, Traversal},
    materialize::{Materialized, materialize, normalize},
    operation::Operation,
    position::PositionAssigner,
    resolver::Resolver,
    store::errors::StoreError,
};

/// An ordered key-value register stored in an operation log.
///
/// `OrderedKeyValue` keeps no state of its own: every read folds the log from
/// scratch, and every write appends exactly one operation. Any number of
/// handles, on any number of replicas of the log, can write concurrently; once
/// their logs hold the same entries they all read the same ordering.
///
/// Writes first resolve the current state to pick a position. Two writers
/// working from the same snapshot may therefore interleave in ways neither
/// intended, but replicas always converge to the same result.
///
/// # Type Parameters
/// - `T`: The value type. Values are stored as JSON; log records whose value
///   does not deserialize into `T` are ignored.
///
/// # Example
///
/// ```
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// use std::sync::Arc;
/// use orderly::{log::InMemoryLog, store::OrderedKeyValue};
///
/// let kv: OrderedKeyValue<String> = OrderedKeyValue::new(Arc::new(InMemoryLog::new()));
/// kv.put("b", "second".to_string()).await.unwrap();
/// kv.put_at("a", "first".to_string(), 0).await.unwrap();
///
/// let keys: Vec<String> = kv.all().await.unwrap().into_iter().map(|e| e.key).collect();
/// assert_eq!(keys, ["a", "b"]);
/// # });
/// ```
pub struct OrderedKeyValue<T = serde_json::Value> {
    log: Arc<dyn OpLog>,
    assigner: Arc<PositionAssigner>,
    phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for OrderedKeyValue<T> {
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
            assigner: Arc::clone(&self.assigner),
            phantom: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for OrderedKeyValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderedKeyValue")
            .field("assigner", &self.assigner)
            .finish_non_exhaustive()
    }
}

/// Reject keys the register cannot hold.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey {
            key: String::new(),
            reason: "key must not be empty".to_string(),
        }
        .into());
    }
    Ok(())
}

impl<T> OrderedKeyValue<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Type identifier of this register, including format version.
    pub const TYPE: &'static str = "ordered-keyvalue";

    /// Open the register stored in `log`.
    pub fn new(log: Arc<dyn OpLog>) -> Self {
        Self::with_assigner(log, PositionAssigner::new())
    }

    /// Open the register with a deterministic position source.
    ///
    /// Two handles writing concurrently must not share a seed, or they will
    /// choose identical positions for the same slot.
    pub fn with_seed(log: Arc<dyn OpLog>, seed: u64) -> Self {
        Self::with_assigner(log, PositionAssigner::seeded(seed))
    }

    fn with_assigner(log: Arc<dyn OpLog>, assigner: PositionAssigner) -> Self {
        Self {
            log,
            assigner: Arc::new(assigner),
            phantom: PhantomData,
        }
    }

    /// The log this register reads and appends to.
    pub fn log(&self) -> &Arc<dyn OpLog> {
        &self.log
    }

    /// Set the value of `key`.
    ///
    /// A new key is appended at the end. An existing key keeps its position
    /// and only its value changes.
    ///
    /// # Returns
    /// The ID of the log entry holding the operation.
    pub async fn put(&self, key: impl AsRef<str>, value: T) -> Result<ID> {
        self.write_put(key.as_ref(), value, None).await
    }

    /// Alias for [`put`](Self::put).
    pub async fn set(&self, key: impl AsRef<str>, value: T) -> Result<ID> {
        self.put(key, value).await
    }

    /// Set the value of `key` and place it at `index`.
    ///
    /// Negative indexes count from the end (`-1` is the last slot). Indexes
    /// past either end are clamped.
    pub async fn put_at(&self, key: impl AsRef<str>, value: T, index: i64) -> Result<ID> {
        self.write_put(key.as_ref(), value, Some(index)).await
    }

    async fn write_put(&self, key: &str, value: T, index: Option<i64>) -> Result<ID> {
        validate_key(key)?;
        let value = serde_json::to_value(value).map_err(|e| StoreError::SerializationFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        let slots = self.positions().await?;
        let existing = slots
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, position)| *position);
        let position = match (index, existing) {
            (None, Some(position)) => position,
            (index, _) => self.assigner.assign(&slots, key, index.unwrap_or(-1)),
        };

        self.append(Operation::Put {
            key: key.to_string(),
            value,
            position: Some(position),
        })
        .await
    }

    /// Move `key` to `index` without changing its value.
    ///
    /// Moving a key that is not live is accepted and has no visible effect;
    /// the log cannot enforce that the key exists by the time the operation
    /// is merged.
    pub async fn move_to(&self, key: impl AsRef<str>, index: i64) -> Result<()> {
        let key = key.as_ref();
        validate_key(key)?;
        let slots = self.positions().await?;
        let position = self.assigner.assign(&slots, key, index);
        self.append(Operation::Move {
            key: key.to_string(),
            position,
        })
        .await?;
        Ok(())
    }

    /// Delete `key`. Always appends a tombstone, even if the key is not live.
    pub async fn delete(&self, key: impl AsRef<str>) -> Result<ID> {
        let key = key.as_ref();
        validate_key(key)?;
        self.append(Operation::Delete {
            key: key.to_string(),
        })
        .await
    }

    /// Get the current value of `key`, or `None` if it was never set or its
    /// latest operation is a delete.
    pub async fn get(&self, key: impl AsRef<str>) -> Result<Option<T>> {
        let key = key.as_ref();
        let mut traversal = Traversal::open(Arc::clone(&self.log)).await?;
        while let Some((hash, entry)) = traversal.next().await? {
            let op = match Operation::decode(entry.payload()) {
                Ok(op) => op,
                Err(e) => {
                    tracing::warn!(entry_id = %hash, error = %e, "Skipping malformed record");
                    continue;
                }
            };
            if op.key() != key {
                continue;
            }
            match op {
                Operation::Put { value, .. } => match serde_json::from_value(value) {
                    Ok(value) => return Ok(Some(value)),
                    Err(e) => {
                        tracing::warn!(
                            entry_id = %hash,
                            key,
                            error = %e,
                            "Skipping record with undecodable value"
                        );
                    }
                },
                Operation::Delete { .. } => return Ok(None),
                Operation::Move { .. } => {}
            }
        }
        Ok(None)
    }

    /// Lazily resolve live entries, newest first, with positions as stored.
    ///
    /// With `limit`, stops after that many live keys. Each call starts a new
    /// pass over the log.
    pub async fn iter(&self, limit: Option<usize>) -> Result<Resolver<T>> {
        Resolver::open(Arc::clone(&self.log), limit).await
    }

    /// All live entries in their final order.
    pub async fn all(&self) -> Result<Vec<Materialized<T>>> {
        let entries = self.iter(None).await?.collect_all().await?;
        Ok(materialize(entries))
    }

    /// Live keys in their final order.
    pub async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.all().await?.into_iter().map(|e| e.key).collect())
    }

    /// Absolute positions of all live keys, in final order.
    async fn positions(&self) -> Result<Vec<(String, f64)>> {
        let entries = self.iter(None).await?.collect_all().await?;
        Ok(normalize(entries)
            .into_iter()
            .map(|placed| (placed.entry.key, placed.position))
            .collect())
    }

    async fn append(&self, op: Operation) -> Result<ID> {
        let payload = op.encode().map_err(|e| StoreError::SerializationFailed {
            key: op.key().to_string(),
            reason: e.to_string(),
        })?;
        let hash = self.log.append(payload).await?;
        match &op {
            Operation::Put { position, .. } => {
                tracing::debug!(op = op.kind(), key = op.key(), ?position, entry_id = %hash, "Appended")
            }
            Operation::Move { position, .. } => {
                tracing::debug!(op = op.kind(), key = op.key(), position, entry_id = %hash, "Appended")
            }
            Operation::Delete { .. } => {
                tracing::debug!(op = op.kind(), key = op.key(), entry_id = %hash, "Appended")
            }
        }
        Ok(hash)
    }
}
