//! AppendItems command handler
//!
//! Items may only be appended while the order is still `Pending`; once
//! the kitchen accepts, the line items are immutable.

use async_trait::async_trait;

use crate::orders::money::{self, to_decimal, to_f64};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::actor::Role;
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderItemInput, OrderStatus};

/// AppendItems action
#[derive(Debug, Clone)]
pub struct AppendItemsAction {
    pub order_id: String,
    pub items: Vec<OrderItemInput>,
}

#[async_trait]
impl CommandHandler for AppendItemsAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Only the counter edits pending orders
        if metadata.role != Role::Counter {
            return Err(OrderError::Unauthorized {
                role: metadata.role,
                action: "append items",
            });
        }

        // 2. Validate items
        if self.items.is_empty() {
            return Err(OrderError::InvalidAmount(
                "append requires at least one item".to_string(),
            ));
        }
        for item in &self.items {
            money::validate_item(item)?;
        }

        // 3. Load the order; appending is only legal while Pending,
        //    from any other status this is InvalidState (not a race)
        let record = ctx.load_record(&self.order_id)?;
        if record.status != OrderStatus::Pending {
            return Err(OrderError::InvalidState {
                status: record.status,
                action: "append items",
            });
        }

        // 4. Snapshot appended items and recompute totals
        let items = money::snapshot_items(&self.items);
        let appended = money::items_subtotal(&items);
        let subtotal = to_f64(to_decimal(record.subtotal) + to_decimal(appended));
        let total = to_f64(to_decimal(subtotal) - to_decimal(record.discount));

        let seq = ctx.next_sequence();
        let event = OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.actor_id.clone(),
            metadata.actor_name.clone(),
            metadata.role,
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::ItemsAppended,
            EventPayload::ItemsAppended {
                items,
                subtotal,
                total,
            },
        );

        Ok(vec![event])
    }
}
