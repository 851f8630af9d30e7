//! RecordPayment command handler: cashier settlement.
//!
//! Emits `PaymentRecorded` and, for dine-in and pickup orders, a
//! `OrderDelivered` in the same batch: handing goods over at the counter
//! and settling are one act. Delivery orders stay `Ready` until the
//! courier proves handoff via the delivery code.
//!
//! Cash semantics: the input amount is the tendered cash; the ledger row
//! stores the settled order total plus the change returned. Every other
//! method must match the total exactly.

use async_trait::async_trait;
use uuid::Uuid;

use crate::orders::money;
use crate::orders::state::{self, Transition};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{
    EventPayload, OrderEvent, OrderEventType, OrderKind, PaymentInput, PaymentMethod,
};

/// RecordPayment action
#[derive(Debug, Clone)]
pub struct RecordPaymentAction {
    pub order_id: String,
    pub shift_id: String,
    pub payment: PaymentInput,
}

#[async_trait]
impl CommandHandler for RecordPaymentAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        money::validate_payment(&self.payment)?;

        let record = ctx.load_record(&self.order_id)?;

        // Settled is checked before the state machine so a retried payment
        // command reports PaymentSettled even after the order moved on.
        if record.is_paid() {
            return Err(OrderError::PaymentSettled(self.order_id.clone()));
        }
        state::ensure(Transition::Settle, &record, metadata.role)?;

        let shift = ctx.shift(&self.shift_id)?;
        if !shift.is_open() {
            return Err(OrderError::ShiftClosed(self.shift_id.clone()));
        }

        if record.total <= 0.0 {
            return Err(OrderError::InvalidAmount(format!(
                "order total must be positive, got {}",
                record.total
            )));
        }

        let change = match self.payment.method {
            PaymentMethod::Cash => {
                if !money::covers_total(self.payment.amount, record.total) {
                    return Err(OrderError::PaymentMismatch(format!(
                        "tendered {} does not cover total {}",
                        self.payment.amount, record.total
                    )));
                }
                money::change_due(self.payment.amount, record.total)
            }
            _ => {
                if !money::amounts_match(self.payment.amount, record.total) {
                    return Err(OrderError::PaymentMismatch(format!(
                        "amount {} does not match total {}",
                        self.payment.amount, record.total
                    )));
                }
                0.0
            }
        };

        let mut events = Vec::with_capacity(2);
        let seq = ctx.next_sequence();
        events.push(OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.actor_id.clone(),
            metadata.actor_name.clone(),
            metadata.role,
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::PaymentRecorded,
            EventPayload::PaymentRecorded {
                payment_id: Uuid::new_v4().to_string(),
                shift_id: self.shift_id.clone(),
                method: self.payment.method,
                amount: record.total,
                change,
            },
        ));

        // Counter handoff completes non-delivery orders in the same batch.
        if record.kind() != OrderKind::Delivery {
            let table_released = match record.destination.table_id() {
                Some(table_id) => !ctx.table_still_referenced(table_id, &self.order_id)?,
                None => false,
            };
            let seq = ctx.next_sequence();
            events.push(OrderEvent::new(
                seq,
                self.order_id.clone(),
                metadata.actor_id.clone(),
                metadata.actor_name.clone(),
                metadata.role,
                metadata.command_id.clone(),
                Some(metadata.timestamp),
                OrderEventType::OrderDelivered,
                EventPayload::OrderDelivered {
                    table_released,
                    courier_id: None,
                },
            ));
        }

        Ok(events)
    }
}
