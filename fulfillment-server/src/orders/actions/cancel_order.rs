//! CancelOrder command handler: `Ready → Canceled`.
//!
//! Reports whether the dine-in table became free, computed against the
//! other active orders inside the same transaction.

use async_trait::async_trait;

use crate::orders::state::{self, Transition};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

/// CancelOrder action
#[derive(Debug, Clone)]
pub struct CancelOrderAction {
    pub order_id: String,
    pub reason: String,
}

#[async_trait]
impl CommandHandler for CancelOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.reason.trim().is_empty() {
            return Err(OrderError::ReasonRequired("cancel an order"));
        }

        let record = ctx.load_record(&self.order_id)?;
        state::ensure(Transition::Cancel, &record, metadata.role)?;

        // The table frees only when no other active order references it
        let table_released = match record.destination.table_id() {
            Some(table_id) => !ctx.table_still_referenced(table_id, &self.order_id)?,
            None => false,
        };

        let seq = ctx.next_sequence();
        let event = OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.actor_id.clone(),
            metadata.actor_name.clone(),
            metadata.role,
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::OrderCanceled,
            EventPayload::OrderCanceled {
                reason: self.reason.clone(),
                table_released,
            },
        );

        Ok(vec![event])
    }
}
