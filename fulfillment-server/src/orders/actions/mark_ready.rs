//! MarkReady command handler: `Preparing → Ready` (kitchen only).

use async_trait::async_trait;

use crate::orders::state::{self, Transition};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

/// MarkReady action
#[derive(Debug, Clone)]
pub struct MarkReadyAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for MarkReadyAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let record = ctx.load_record(&self.order_id)?;
        state::ensure(Transition::MarkReady, &record, metadata.role)?;

        let seq = ctx.next_sequence();
        let event = OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.actor_id.clone(),
            metadata.actor_name.clone(),
            metadata.role,
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::OrderReady,
            EventPayload::OrderReady {},
        );

        Ok(vec![event])
    }
}
