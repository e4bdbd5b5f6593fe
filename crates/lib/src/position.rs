//! Position assignment for the ordered register.
//!
//! Keys are ordered by a real-valued position. Placing a key at a list index
//! means picking a number between the positions of the entries that will end
//! up on either side of it, so no other key ever has to be renumbered.
//!
//! The number is drawn at random inside the gap rather than at its midpoint:
//! two writers inserting into the same gap concurrently would otherwise pick
//! the same position. Each insertion into a gap shrinks it, so after many
//! tens of insertions into one spot float precision runs out and positions
//! can collide; the resolver's recency tie-break keeps the result
//! deterministic when they do.

use std::sync::Mutex;

use rand::{Rng, SeedableRng, distributions::Open01, rngs::StdRng};

/// Resolve a caller-supplied index against a list of `len` entries.
///
/// Non-negative indexes count from the start. Negative indexes count from the
/// end: `-1` appends, `-(len + 1)` is the first slot. The result is not
/// clamped.
fn resolve_slot(index: i64, len: i64) -> i64 {
    if index >= 0 { index } else { len + 1 + index }
}

/// Compute a position that places `key` at `index` among `entries`.
///
/// `entries` are `(key, position)` pairs of the live keys and need not be
/// sorted; entries with equal positions keep their relative input order.
/// If `key` is already among them and is moving towards the end, the slot it
/// vacates is accounted for, so `index` means the final index of the key.
/// Indexes past either end are clamped.
///
/// ```
/// use orderly::position::scale_position;
///
/// let mut rng = rand::thread_rng();
/// let entries = [("a", 1.0), ("b", 2.0)];
/// let p = scale_position(&mut rng, &entries, "c", 1);
/// assert!(p > 1.0 && p < 2.0);
/// ```
pub fn scale_position<R, K>(rng: &mut R, entries: &[(K, f64)], key: &str, index: i64) -> f64
where
    R: Rng + ?Sized,
    K: AsRef<str>,
{
    let mut sorted: Vec<(&str, f64)> = entries.iter().map(|(k, p)| (k.as_ref(), *p)).collect();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1));

    let len = sorted.len() as i64;
    let mut slot = resolve_slot(index, len);
    if let Some(current) = sorted.iter().position(|(k, _)| *k == key)
        && slot > current as i64
    {
        slot = slot.saturating_add(1);
    }
    let slot = slot.clamp(0, len) as usize;

    let before = slot.checked_sub(1).map(|i| sorted[i].1);
    let after = sorted.get(slot).map(|(_, p)| *p);

    let fraction: f64 = rng.sample(Open01);
    let position = match (before, after) {
        (None, None) => fraction,
        (None, Some(after)) => after - fraction,
        (Some(before), None) => before + fraction,
        (Some(before), Some(after)) => before + (after - before) * fraction,
    };

    let collides = before.is_some_and(|b| position <= b) || after.is_some_and(|a| position >= a);
    if collides {
        tracing::warn!(
            key,
            index,
            position,
            ?before,
            ?after,
            "Position gap exhausted; entry may tie with a neighbour"
        );
    }
    position
}

/// Thread-safe position source used by the register when encoding operations.
#[derive(Debug)]
pub struct PositionAssigner {
    rng: Mutex<StdRng>,
}

impl PositionAssigner {
    /// Assigner seeded from operating system entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Assigner with a fixed seed, for reproducible positions.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// See [`scale_position`].
    pub fn assign<K: AsRef<str>>(&self, entries: &[(K, f64)], key: &str, index: i64) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        scale_position(&mut *rng, entries, key, index)
    }
}

impl Default for PositionAssigner {
    fn default() -> Self {
        Self::new()
    }
}
