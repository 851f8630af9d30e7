//! RejectOrder command handler: `Pending|Preparing → Canceled`.

use async_trait::async_trait;

use crate::orders::state::{self, Transition};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

/// RejectOrder action
#[derive(Debug, Clone)]
pub struct RejectOrderAction {
    pub order_id: String,
    pub reason: String,
}

#[async_trait]
impl CommandHandler for RejectOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.reason.trim().is_empty() {
            return Err(OrderError::ReasonRequired("reject an order"));
        }

        let record = ctx.load_record(&self.order_id)?;
        state::ensure(Transition::Reject, &record, metadata.role)?;

        let seq = ctx.next_sequence();
        let event = OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.actor_id.clone(),
            metadata.actor_name.clone(),
            metadata.role,
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::OrderRejected,
            EventPayload::OrderRejected {
                reason: self.reason.clone(),
            },
        );

        Ok(vec![event])
    }
}
