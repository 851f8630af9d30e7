//! VerifyDelivery command handler: proof-of-delivery for courier orders.
//!
//! The courier presents the code the customer received out-of-band. On a
//! match the order completes; a cash-on-delivery order additionally settles
//! against the provided shift in the same batch.

use async_trait::async_trait;
use uuid::Uuid;

use crate::orders::state::{self, Transition};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderKind, PaymentMethod};

/// VerifyDelivery action
#[derive(Debug, Clone)]
pub struct VerifyDeliveryAction {
    pub order_id: String,
    pub code: String,
    /// Shift to settle against when the order is still unpaid
    pub shift_id: Option<String>,
}

#[async_trait]
impl CommandHandler for VerifyDeliveryAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let record = ctx.load_record(&self.order_id)?;
        if record.kind() != OrderKind::Delivery {
            return Err(OrderError::NotDelivery(self.order_id.clone()));
        }
        state::ensure(Transition::Deliver, &record, metadata.role)?;

        if self.code != record.delivery_code {
            return Err(OrderError::InvalidDeliveryCode);
        }

        let mut events = Vec::with_capacity(2);

        // Cash on delivery: settle against an open shift in the same batch.
        if !record.is_paid() {
            let shift_id = self.shift_id.as_deref().ok_or_else(|| {
                OrderError::ShiftNotFound("cash-on-delivery requires an open shift".to_string())
            })?;
            let shift = ctx.shift(shift_id)?;
            if !shift.is_open() {
                return Err(OrderError::ShiftClosed(shift_id.to_string()));
            }

            if record.total <= 0.0 {
                return Err(OrderError::InvalidAmount(format!(
                    "order total must be positive, got {}",
                    record.total
                )));
            }

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
                    shift_id: shift_id.to_string(),
                    method: PaymentMethod::Cash,
                    amount: record.total,
                    change: 0.0,
                },
            ));
        }

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
                table_released: false,
                courier_id: record.courier_id.clone(),
            },
        ));

        Ok(events)
    }
}
