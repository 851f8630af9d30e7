//! CreateOrder command handler
//!
//! Creates an order in `Pending` with snapshotted items, a venue-wide
//! order number, and a freshly generated delivery code.

use async_trait::async_trait;

use crate::orders::money;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::actor::Role;
use shared::order::{
    CustomerInfo, Destination, EventPayload, OrderEvent, OrderEventType, OrderItemInput,
};

/// CreateOrder action
#[derive(Debug, Clone)]
pub struct CreateOrderAction {
    pub destination: Destination,
    pub customer: CustomerInfo,
    pub items: Vec<OrderItemInput>,
}

#[async_trait]
impl CommandHandler for CreateOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Only the counter creates orders
        if metadata.role != Role::Counter {
            return Err(OrderError::Unauthorized {
                role: metadata.role,
                action: "create order",
            });
        }

        // 2. Validate items (at least one, finite positive prices)
        if self.items.is_empty() {
            return Err(OrderError::InvalidAmount(
                "order must contain at least one item".to_string(),
            ));
        }
        for item in &self.items {
            money::validate_item(item)?;
        }

        // 3. Snapshot items and compute totals
        let items = money::snapshot_items(&self.items);
        let subtotal = money::items_subtotal(&items);
        let total = subtotal;

        // 4. Allocate number and sequence inside the transaction, so a
        //    failed create never burns either
        let number = ctx.next_order_number()?;
        let seq = ctx.next_sequence();

        // 5. Generate identity and the proof-of-delivery code. The code
        //    travels to the customer out-of-band (receipt stub), never to
        //    the courier.
        let order_id = uuid::Uuid::new_v4().to_string();
        let delivery_code = shared::util::delivery_code();

        let event = OrderEvent::new(
            seq,
            order_id,
            metadata.actor_id.clone(),
            metadata.actor_name.clone(),
            metadata.role,
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::OrderCreated,
            EventPayload::OrderCreated {
                number,
                destination: self.destination.clone(),
                customer: self.customer.clone(),
                items,
                subtotal,
                total,
                delivery_code,
            },
        );

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::storage::OrderStorage;

    fn metadata(role: Role) -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".to_string(),
            actor_id: "op-1".to_string(),
            actor_name: "Test Operator".to_string(),
            role,
            timestamp: 1234567890,
        }
    }

    fn item(name: &str, price: f64, qty: i32) -> OrderItemInput {
        OrderItemInput {
            name: name.to_string(),
            unit_price: price,
            quantity: qty,
            note: None,
        }
    }

    fn dine_in(table: &str) -> Destination {
        Destination::DineIn {
            table_id: table.to_string(),
            table_label: table.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_order_generates_event() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let action = CreateOrderAction {
            destination: dine_in("T5"),
            customer: CustomerInfo::default(),
            items: vec![item("X-Burger", 10.0, 2), item("Guarana", 5.0, 1)],
        };

        let events = action.execute(&mut ctx, &metadata(Role::Counter)).await.unwrap();
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert_eq!(event.event_type, OrderEventType::OrderCreated);
        assert_eq!(event.sequence, 1);

        if let EventPayload::OrderCreated {
            number,
            items,
            subtotal,
            total,
            delivery_code,
            ..
        } = &event.payload
        {
            assert_eq!(*number, 1);
            assert_eq!(items.len(), 2);
            assert_eq!(items[0].line_total, 20.0);
            assert_eq!(*subtotal, 25.0);
            assert_eq!(*total, 25.0);
            assert_eq!(delivery_code.len(), 4);
        } else {
            panic!("Expected OrderCreated payload");
        }
    }

    #[tokio::test]
    async fn test_create_order_by_kitchen_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let action = CreateOrderAction {
            destination: Destination::Pickup,
            customer: CustomerInfo::default(),
            items: vec![item("X-Burger", 10.0, 1)],
        };

        let result = action.execute(&mut ctx, &metadata(Role::Kitchen)).await;
        assert!(matches!(result, Err(OrderError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_create_order_with_no_items_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let action = CreateOrderAction {
            destination: Destination::Pickup,
            customer: CustomerInfo::default(),
            items: vec![],
        };

        let result = action.execute(&mut ctx, &metadata(Role::Counter)).await;
        assert!(matches!(result, Err(OrderError::InvalidAmount(_))));
    }

    #[tokio::test]
    async fn test_create_order_with_invalid_price_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let action = CreateOrderAction {
            destination: Destination::Pickup,
            customer: CustomerInfo::default(),
            items: vec![item("X-Burger", -1.0, 1)],
        };

        let result = action.execute(&mut ctx, &metadata(Role::Counter)).await;
        assert!(matches!(result, Err(OrderError::InvalidAmount(_))));
    }
}
