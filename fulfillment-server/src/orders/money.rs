//! Money calculation utilities using rust_decimal for precision.
//!
//! All arithmetic runs on `Decimal` internally and converts back to `f64`
//! (2 decimal places, half-up) for storage and serialization.

use crate::orders::traits::OrderError;
use rust_decimal::prelude::*;
use shared::order::{OrderItemInput, OrderItemSnapshot, PaymentInput};

const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed unit price per item (R$1,000,000)
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per item
const MAX_QUANTITY: i32 = 9999;
/// Maximum allowed payment amount (R$1,000,000)
const MAX_PAYMENT_AMOUNT: f64 = 1_000_000.0;

/// Convert an f64 to Decimal, falling back to zero on non-finite input.
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Convert a Decimal back to f64, rounded to 2 decimal places.
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp(DECIMAL_PLACES)
        .to_f64()
        .unwrap_or(0.0)
}

#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), OrderError> {
    if !value.is_finite() {
        return Err(OrderError::InvalidAmount(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate an item input before snapshotting it onto an order.
pub fn validate_item(item: &OrderItemInput) -> Result<(), OrderError> {
    require_finite(item.unit_price, "unit_price")?;
    if item.unit_price < 0.0 {
        return Err(OrderError::InvalidAmount(format!(
            "unit_price must be non-negative, got {}",
            item.unit_price
        )));
    }
    if item.unit_price > MAX_PRICE {
        return Err(OrderError::InvalidAmount(format!(
            "unit_price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, item.unit_price
        )));
    }
    if item.quantity <= 0 {
        return Err(OrderError::InvalidAmount(format!(
            "quantity must be positive, got {}",
            item.quantity
        )));
    }
    if item.quantity > MAX_QUANTITY {
        return Err(OrderError::InvalidAmount(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, item.quantity
        )));
    }
    Ok(())
}

/// Validate a payment input before processing.
pub fn validate_payment(payment: &PaymentInput) -> Result<(), OrderError> {
    require_finite(payment.amount, "payment amount")?;
    if payment.amount <= 0.0 {
        return Err(OrderError::InvalidAmount(
            "payment amount must be positive".to_string(),
        ));
    }
    if payment.amount > MAX_PAYMENT_AMOUNT {
        return Err(OrderError::InvalidAmount(format!(
            "payment amount exceeds maximum allowed ({})",
            MAX_PAYMENT_AMOUNT
        )));
    }
    Ok(())
}

/// Snapshot item inputs, computing line totals.
///
/// Inputs must already be validated.
pub fn snapshot_items(items: &[OrderItemInput]) -> Vec<OrderItemSnapshot> {
    items
        .iter()
        .map(|item| {
            let line = to_decimal(item.unit_price) * Decimal::from(item.quantity);
            OrderItemSnapshot {
                name: item.name.clone(),
                unit_price: item.unit_price,
                quantity: item.quantity,
                line_total: to_f64(line),
                note: item.note.clone(),
            }
        })
        .collect()
}

/// Sum of line totals.
pub fn items_subtotal(items: &[OrderItemSnapshot]) -> f64 {
    let sum = items
        .iter()
        .fold(Decimal::ZERO, |acc, item| acc + to_decimal(item.line_total));
    to_f64(sum)
}

/// Whether `amount` settles `total` exactly, within tolerance.
pub fn amounts_match(amount: f64, total: f64) -> bool {
    (to_decimal(amount) - to_decimal(total)).abs() <= MONEY_TOLERANCE
}

/// Whether tendered cash covers the total, within tolerance.
pub fn covers_total(tendered: f64, total: f64) -> bool {
    to_decimal(tendered) >= to_decimal(total) - MONEY_TOLERANCE
}

/// Cash change: `max(0, tendered - total)`.
pub fn change_due(tendered: f64, total: f64) -> f64 {
    let diff = to_decimal(tendered) - to_decimal(total);
    to_f64(diff.max(Decimal::ZERO))
}
