//! Height calculation strategies for log entries.
//!
//! The height of an entry places it in the causal order of the log: every
//! entry is strictly higher than all of its parents, so visiting entries by
//! descending height visits causally-later entries first.

use serde::{Deserialize, Serialize};

use crate::clock::Clock;

/// Height calculation strategy for entries appended to a log.
///
/// - [`Incremental`](HeightStrategy::Incremental): Simple monotonic counter, optimal for offline-first
/// - [`Timestamp`](HeightStrategy::Timestamp): Time-aware ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeightStrategy {
    /// Incremental height: `height = max(parent_heights) + 1`
    ///
    /// Entries without parents have height 0.
    #[default]
    Incremental,

    /// Timestamp-based height: `height = max(current_timestamp_ms, max(parent_heights) + 1)`
    ///
    /// Concurrent writes from different replicas then interleave roughly by
    /// wall-clock time instead of by history length.
    ///
    /// **Note**: Requires reasonably synchronized clocks across writers.
    Timestamp,
}

impl HeightStrategy {
    /// Calculate the height for an entry given the maximum height among its
    /// parents, or `None` if it has no parents.
    pub fn calculate_height(&self, max_parent_height: Option<u64>, clock: &dyn Clock) -> u64 {
        let min_height = max_parent_height.map(|h| h + 1).unwrap_or(0);
        match self {
            HeightStrategy::Incremental => min_height,
            HeightStrategy::Timestamp => {
                let timestamp_ms = clock.now_millis();
                if min_height > timestamp_ms {
                    let skew_ms = min_height - timestamp_ms;
                    tracing::warn!(
                        parent_height = max_parent_height.unwrap_or(0),
                        current_timestamp_ms = timestamp_ms,
                        skew_ms,
                        "Clock skew detected: parent timestamp is {}ms ahead of local clock",
                        skew_ms
                    );
                }
                timestamp_ms.max(min_height)
            }
        }
    }
}

impl std::str::FromStr for HeightStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incremental" => Ok(HeightStrategy::Incremental),
            "timestamp" => Ok(HeightStrategy::Timestamp),
            other => Err(format!(
                "unknown height strategy '{other}'; expected 'incremental' or 'timestamp'"
            )),
        }
    }
}
