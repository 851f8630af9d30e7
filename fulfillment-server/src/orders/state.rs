//! Order state machine: legal transitions and who may trigger them.
//!
//! ```text
//! Pending --accept--> Preparing --mark_ready--> Ready --settle/deliver--> Delivered
//! Pending|Preparing --reject(reason)--> Canceled
//! Ready --cancel(reason)--> Canceled
//! ```
//!
//! A transition from a status outside its source set fails without
//! mutating anything: `InvalidState` when the order is terminal,
//! `StaleTransition` when a concurrent actor moved it first.

use crate::orders::traits::OrderError;
use shared::actor::Role;
use shared::order::{OrderRecord, OrderStatus};

/// A named transition of the order state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Counter/kitchen accepts a pending order into preparation.
    Accept,
    /// Kitchen finishes preparation.
    MarkReady,
    /// Counter/kitchen rejects an order not yet ready.
    Reject,
    /// Counter cancels a ready order.
    Cancel,
    /// Courier claims a ready delivery order (status stays Ready).
    Claim,
    /// Cashier settles payment at the counter.
    Settle,
    /// Courier completes a delivery with proof-of-delivery.
    Deliver,
}

impl Transition {
    pub fn name(&self) -> &'static str {
        match self {
            Transition::Accept => "accept",
            Transition::MarkReady => "mark ready",
            Transition::Reject => "reject",
            Transition::Cancel => "cancel",
            Transition::Claim => "claim",
            Transition::Settle => "settle payment",
            Transition::Deliver => "complete delivery",
        }
    }

    /// Statuses this transition may start from.
    pub fn sources(&self) -> &'static [OrderStatus] {
        match self {
            Transition::Accept => &[OrderStatus::Pending],
            Transition::MarkReady => &[OrderStatus::Preparing],
            Transition::Reject => &[OrderStatus::Pending, OrderStatus::Preparing],
            Transition::Cancel => &[OrderStatus::Ready],
            Transition::Claim => &[OrderStatus::Ready],
            Transition::Settle => &[OrderStatus::Ready],
            Transition::Deliver => &[OrderStatus::Ready],
        }
    }

    /// Roles authorized to request this transition.
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Transition::Accept => &[Role::Counter, Role::Kitchen],
            Transition::MarkReady => &[Role::Kitchen],
            Transition::Reject => &[Role::Counter, Role::Kitchen],
            Transition::Cancel => &[Role::Counter],
            Transition::Claim => &[Role::Courier],
            Transition::Settle => &[Role::Cashier],
            Transition::Deliver => &[Role::Courier],
        }
    }
}

/// Check a transition request against the record's current status and
/// the requesting role. Returns `Ok(())` when the transition may proceed.
pub fn ensure(transition: Transition, record: &OrderRecord, role: Role) -> Result<(), OrderError> {
    if !transition.allowed_roles().contains(&role) {
        return Err(OrderError::Unauthorized {
            role,
            action: transition.name(),
        });
    }

    let sources = transition.sources();
    if sources.contains(&record.status) {
        return Ok(());
    }

    if record.status.is_terminal() {
        Err(OrderError::InvalidState {
            status: record.status,
            action: transition.name(),
        })
    } else {
        Err(OrderError::StaleTransition {
            expected: sources[0],
            actual: record.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_status(status: OrderStatus) -> OrderRecord {
        let mut record = OrderRecord::new("order-1".to_string());
        record.status = status;
        record
    }

    #[test]
    fn accept_from_pending_succeeds() {
        let record = record_with_status(OrderStatus::Pending);
        assert!(ensure(Transition::Accept, &record, Role::Counter).is_ok());
        assert!(ensure(Transition::Accept, &record, Role::Kitchen).is_ok());
    }

    #[test]
    fn accept_by_courier_is_unauthorized() {
        let record = record_with_status(OrderStatus::Pending);
        let result = ensure(Transition::Accept, &record, Role::Courier);
        assert!(matches!(result, Err(OrderError::Unauthorized { .. })));
    }

    #[test]
    fn mark_ready_from_pending_is_stale() {
        // Kitchen racing ahead of the counter's accept
        let record = record_with_status(OrderStatus::Pending);
        let result = ensure(Transition::MarkReady, &record, Role::Kitchen);
        assert!(matches!(
            result,
            Err(OrderError::StaleTransition {
                expected: OrderStatus::Preparing,
                actual: OrderStatus::Pending,
            })
        ));
    }

    #[test]
    fn transitions_from_terminal_are_invalid_state() {
        for status in [OrderStatus::Delivered, OrderStatus::Canceled] {
            let record = record_with_status(status);
            let result = ensure(Transition::Cancel, &record, Role::Counter);
            assert!(matches!(result, Err(OrderError::InvalidState { .. })));
        }
    }

    #[test]
    fn reject_allowed_from_pending_and_preparing_only() {
        for status in [OrderStatus::Pending, OrderStatus::Preparing] {
            let record = record_with_status(status);
            assert!(ensure(Transition::Reject, &record, Role::Kitchen).is_ok());
        }
        let record = record_with_status(OrderStatus::Ready);
        assert!(matches!(
            ensure(Transition::Reject, &record, Role::Kitchen),
            Err(OrderError::StaleTransition { .. })
        ));
    }

    #[test]
    fn settle_requires_cashier_and_ready() {
        let record = record_with_status(OrderStatus::Ready);
        assert!(ensure(Transition::Settle, &record, Role::Cashier).is_ok());
        assert!(matches!(
            ensure(Transition::Settle, &record, Role::Counter),
            Err(OrderError::Unauthorized { .. })
        ));

        let record = record_with_status(OrderStatus::Preparing);
        assert!(matches!(
            ensure(Transition::Settle, &record, Role::Cashier),
            Err(OrderError::StaleTransition { .. })
        ));
    }
}
