//! Live courier positions.
//!
//! Fixes are ephemeral operational data: kept in memory only, never
//! persisted, and gone after a restart until the next report arrives.

use dashmap::DashMap;
use shared::models::PositionFix;

/// In-memory last-known-position map, keyed by courier.
#[derive(Debug, Default)]
pub struct PositionTracker {
    positions: DashMap<String, PositionFix>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fix. Updates are monotonic by `recorded_at`: a fix older
    /// than the stored one is discarded. Returns whether the fix was kept.
    pub fn record(&self, courier_id: &str, fix: PositionFix) -> bool {
        let mut kept = true;
        self.positions
            .entry(courier_id.to_string())
            .and_modify(|current| {
                if fix.recorded_at > current.recorded_at {
                    *current = fix;
                } else {
                    kept = false;
                }
            })
            .or_insert(fix);
        kept
    }

    /// Last known fix for a courier
    pub fn get(&self, courier_id: &str) -> Option<PositionFix> {
        self.positions.get(courier_id).map(|entry| *entry.value())
    }

    /// Drop a courier's fix (on deactivation)
    pub fn remove(&self, courier_id: &str) {
        self.positions.remove(courier_id);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
