//! Cashier shift and payment models.

use crate::order::PaymentMethod;
use serde::{Deserialize, Serialize};

/// Shift status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftStatus {
    #[default]
    Open,
    Closed,
}

/// Cashier shift: a bounded session during which one operator is
/// authorized to record payments against an opened cash float.
///
/// At most one open shift per operator at any time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashierShift {
    pub shift_id: String,
    pub operator_id: String,
    pub operator_name: String,
    pub status: ShiftStatus,
    /// Starting cash amount
    pub opening_float: f64,
    /// Shift open time (Unix milliseconds)
    pub opened_at: i64,
    /// Shift close time, None while open
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<i64>,
}

impl CashierShift {
    pub fn is_open(&self) -> bool {
        self.status == ShiftStatus::Open
    }
}

/// Payment ledger row. Inserting this row is the authoritative "paid"
/// event; it is created exactly once per order settlement, atomically with
/// the order's own payment-status update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub payment_id: String,
    pub order_id: String,
    pub shift_id: String,
    pub method: PaymentMethod,
    /// Amount applied to the order (the order total)
    pub amount: f64,
    /// Cash change returned to the customer
    #[serde(default)]
    pub change: f64,
    pub recorded_at: i64,
}

/// Per-method aggregate within a shift summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MethodTotal {
    pub method: PaymentMethod,
    pub amount: f64,
    pub count: usize,
}

/// Shift summary, always derived from Payment rows at read time, never a
/// stored running total, so retried or failed writes cannot cause drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftSummary {
    pub shift_id: String,
    pub by_method: Vec<MethodTotal>,
    /// Cash received during the shift
    pub cash_total: f64,
    /// Opening float + cash received
    pub expected_cash: f64,
    pub payment_count: usize,
}
