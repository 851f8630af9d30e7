//! ClaimOrder command handler: courier claim arbitration.
//!
//! Claims run inside the single write transaction, so two couriers racing
//! for the same order serialize: the first writer wins, the loser observes
//! the assignment and gets `AlreadyClaimed`.

use async_trait::async_trait;

use crate::orders::state::{self, Transition};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderKind};

/// ClaimOrder action
#[derive(Debug, Clone)]
pub struct ClaimOrderAction {
    pub order_id: String,
    pub courier_id: String,
}

#[async_trait]
impl CommandHandler for ClaimOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let courier = ctx.courier(&self.courier_id)?;
        if !courier.active {
            return Err(OrderError::CourierInactive(self.courier_id.clone()));
        }

        let record = ctx.load_record(&self.order_id)?;
        if record.kind() != OrderKind::Delivery {
            return Err(OrderError::NotDelivery(self.order_id.clone()));
        }
        state::ensure(Transition::Claim, &record, metadata.role)?;

        // Conditional write: an existing assignment means another courier
        // already won this order.
        if let Some(existing) = &record.courier_id {
            return Err(OrderError::AlreadyClaimed {
                order_id: self.order_id.clone(),
                courier_id: existing.clone(),
            });
        }

        let seq = ctx.next_sequence();
        let event = OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.actor_id.clone(),
            metadata.actor_name.clone(),
            metadata.role,
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::CourierAssigned,
            EventPayload::CourierAssigned {
                courier_id: self.courier_id.clone(),
            },
        );

        Ok(vec![event])
    }
}
