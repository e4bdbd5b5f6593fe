//! Turning resolved entries into the final ordered view.

use crate::{entry::ID, resolver::LiveEntry};

/// One element of the materialized register, in final order.
#[derive(Debug, Clone, PartialEq)]
pub struct Materialized<T> {
    pub key: String,
    pub value: T,
    pub hash: ID,
}

/// A resolved entry with its position made absolute.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Placed<T> {
    pub(crate) entry: LiveEntry<T>,
    pub(crate) position: f64,
}

/// Smallest step from `position` that is guaranteed to move past it.
fn step_past(position: f64) -> f64 {
    position + 1.0_f64.max(position.abs() * f64::EPSILON)
}

/// Give every entry an absolute position and sort.
///
/// Entries with a position are ordered by it, with the more recent entry
/// first where positions are equal. Entries without a position follow all of
/// them, oldest first, and are numbered upwards from the largest finite
/// position. The order depends only on the log's contents.
pub(crate) fn normalize<T>(entries: Vec<LiveEntry<T>>) -> Vec<Placed<T>> {
    let (mut placed, mut appended): (Vec<_>, Vec<_>) = (Vec::new(), Vec::new());
    for entry in entries {
        match entry.position {
            Some(position) => placed.push(Placed { entry, position }),
            None => appended.push(entry),
        }
    }

    placed.sort_by(|a, b| {
        a.position
            .total_cmp(&b.position)
            .then_with(|| b.entry.recency.cmp(&a.entry.recency))
    });

    let mut cursor = placed
        .iter()
        .map(|p| p.position)
        .filter(|p| p.is_finite())
        .max_by(f64::total_cmp)
        .unwrap_or(0.0);
    appended.sort_by_key(|e| e.recency);
    placed.extend(appended.into_iter().map(|entry| {
        cursor = step_past(cursor);
        Placed {
            entry,
            position: cursor,
        }
    }));
    placed
}

/// Order resolved entries and strip resolution metadata.
pub fn materialize<T>(entries: Vec<LiveEntry<T>>) -> Vec<Materialized<T>> {
    normalize(entries)
        .into_iter()
        .map(|placed| Materialized {
            key: placed.entry.key,
            value: placed.entry.value,
            hash: placed.entry.hash,
        })
        .collect()
}
