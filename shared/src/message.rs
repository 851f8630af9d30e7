//! Change notices, the fan-out payload.
//!
//! Notices are idempotent re-fetch triggers, not the data itself. A client
//! that misses one converges on reconnect by re-listing its active-order
//! subset. Delivery is at-least-once.

use crate::order::OrderEventType;
use serde::{Deserialize, Serialize};

/// Venue-scoped change notification broadcast after every committed command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeNotice {
    pub venue_id: String,
    pub order_id: String,
    /// Human-readable order number, for display in toasts/tickers
    pub number: u64,
    pub kind: OrderEventType,
    /// Global event sequence; clients track the high-water mark to detect gaps
    pub sequence: u64,
}
