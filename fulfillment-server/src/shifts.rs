//! Cashier shift ledger: open/close sessions and derived summaries.
//!
//! A shift is the unit of cash accountability. Totals are never stored:
//! the summary is recomputed from the Payment rows referencing the shift,
//! so a crashed or retried write can never cause ledger drift.

use rust_decimal::Decimal;

use crate::orders::money::{to_decimal, to_f64};
use crate::orders::storage::OrderStorage;
use crate::orders::traits::OrderError;
use shared::models::{CashierShift, MethodTotal, ShiftStatus, ShiftSummary};
use shared::order::PaymentMethod;

/// Shift ledger over the shared order storage.
#[derive(Clone)]
pub struct ShiftLedger {
    storage: OrderStorage,
}

impl ShiftLedger {
    pub fn new(storage: OrderStorage) -> Self {
        Self { storage }
    }

    /// Open a shift for an operator.
    ///
    /// At most one open shift per operator; the uniqueness check and the
    /// insert run in one write transaction.
    pub fn open_shift(
        &self,
        operator_id: &str,
        operator_name: &str,
        opening_float: f64,
    ) -> Result<CashierShift, OrderError> {
        if !opening_float.is_finite() || opening_float < 0.0 {
            return Err(OrderError::InvalidAmount(format!(
                "opening float must be non-negative, got {opening_float}"
            )));
        }

        let txn = self.storage.begin_write()?;
        if let Some(existing) = self
            .storage
            .open_shift_for_operator_txn(&txn, operator_id)?
        {
            tracing::warn!(operator_id, shift_id = %existing.shift_id, "Operator already has an open shift");
            return Err(OrderError::ShiftAlreadyOpen(operator_id.to_string()));
        }

        let shift = CashierShift {
            shift_id: uuid::Uuid::new_v4().to_string(),
            operator_id: operator_id.to_string(),
            operator_name: operator_name.to_string(),
            status: ShiftStatus::Open,
            opening_float,
            opened_at: shared::util::now_millis(),
            closed_at: None,
        };
        self.storage.store_shift(&txn, &shift)?;
        txn.commit().map_err(crate::orders::storage::StorageError::from)?;

        tracing::info!(shift_id = %shift.shift_id, operator_id, opening_float, "Shift opened");
        Ok(shift)
    }

    /// Close a shift. Closing is terminal; payments against a closed shift
    /// are rejected at settlement time.
    pub fn close_shift(&self, shift_id: &str) -> Result<CashierShift, OrderError> {
        let txn = self.storage.begin_write()?;
        let mut shift = self
            .storage
            .get_shift_txn(&txn, shift_id)?
            .ok_or_else(|| OrderError::ShiftNotFound(shift_id.to_string()))?;

        if !shift.is_open() {
            return Err(OrderError::ShiftClosed(shift_id.to_string()));
        }

        shift.status = ShiftStatus::Closed;
        shift.closed_at = Some(shared::util::now_millis());
        self.storage.store_shift(&txn, &shift)?;
        txn.commit().map_err(crate::orders::storage::StorageError::from)?;

        tracing::info!(shift_id = %shift.shift_id, "Shift closed");
        Ok(shift)
    }

    /// Get a shift by ID
    pub fn get_shift(&self, shift_id: &str) -> Result<Option<CashierShift>, OrderError> {
        Ok(self.storage.get_shift(shift_id)?)
    }

    /// List all shifts, most recently opened first
    pub fn list_shifts(&self) -> Result<Vec<CashierShift>, OrderError> {
        let mut shifts = self.storage.list_shifts()?;
        shifts.sort_by_key(|s| std::cmp::Reverse(s.opened_at));
        Ok(shifts)
    }

    /// Derive the shift summary from its Payment rows.
    ///
    /// Works for open and closed shifts alike; a mid-shift read gives the
    /// running totals.
    pub fn summary(&self, shift_id: &str) -> Result<ShiftSummary, OrderError> {
        let shift = self
            .storage
            .get_shift(shift_id)?
            .ok_or_else(|| OrderError::ShiftNotFound(shift_id.to_string()))?;

        let payments = self.storage.get_payments_for_shift(shift_id)?;

        let mut by_method: Vec<MethodTotal> = Vec::new();
        let mut cash_total = Decimal::ZERO;
        for payment in &payments {
            if payment.method == PaymentMethod::Cash {
                cash_total += to_decimal(payment.amount);
            }
            match by_method.iter_mut().find(|t| t.method == payment.method) {
                Some(total) => {
                    total.amount = to_f64(to_decimal(total.amount) + to_decimal(payment.amount));
                    total.count += 1;
                }
                None => by_method.push(MethodTotal {
                    method: payment.method,
                    amount: payment.amount,
                    count: 1,
                }),
            }
        }

        let expected_cash = to_f64(to_decimal(shift.opening_float) + cash_total);

        Ok(ShiftSummary {
            shift_id: shift.shift_id,
            by_method,
            cash_total: to_f64(cash_total),
            expected_cash,
            payment_count: payments.len(),
        })
    }
}
