//! Courier models: registry, live position, derived earnings.

use serde::{Deserialize, Serialize};

/// Vehicle type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    Motorcycle,
    Bicycle,
    Car,
}

/// Courier registry entry.
///
/// Couriers with historical deliveries are deactivated, never hard-deleted,
/// so earnings rows keep a valid back-reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Courier {
    pub courier_id: String,
    pub name: String,
    pub vehicle: VehicleType,
    pub active: bool,
    pub created_at: i64,
}

/// Live position fix. Updates are monotonic by `recorded_at`; a stale fix
/// arriving late is discarded, not applied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PositionFix {
    pub lat: f64,
    pub lng: f64,
    /// Fix timestamp (Unix milliseconds), attached by the reporting device
    pub recorded_at: i64,
}

/// One derived earnings row per delivered order referencing a courier.
///
/// Informational reconciliation against the venue's payout process; not
/// itself money-moving.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EarningEntry {
    pub order_id: String,
    pub courier_id: String,
    pub amount: f64,
    pub delivered_at: i64,
    #[serde(default)]
    pub settled: bool,
}

/// Earnings report for one courier, totals computed at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourierEarnings {
    pub courier_id: String,
    pub pending_total: f64,
    pub settled_total: f64,
    pub entries: Vec<EarningEntry>,
}
