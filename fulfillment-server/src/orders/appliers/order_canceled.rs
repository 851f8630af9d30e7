//! OrderCanceled event applier.
//!
//! `table_released` in the payload is informational for clients; the
//! record itself carries no occupancy flag (occupancy is derived).

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderRecord, OrderStatus};

pub struct OrderCanceledApplier;

impl EventApplier for OrderCanceledApplier {
    fn apply(&self, record: &mut OrderRecord, event: &OrderEvent) {
        if let EventPayload::OrderCanceled { reason, .. } = &event.payload {
            record.status = OrderStatus::Canceled;
            record.cancel_reason = Some(reason.clone());
            record.updated_at = event.timestamp;
            record.last_sequence = event.sequence;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::OrderEventType;
    use shared::Role;

    #[test]
    fn cancels_with_reason() {
        let mut record = OrderRecord::new("order-1".to_string());
        record.status = OrderStatus::Ready;

        let event = OrderEvent::new(
            3,
            "order-1".to_string(),
            "op-1".to_string(),
            "Counter".to_string(),
            Role::Counter,
            "cmd-3".to_string(),
            None,
            OrderEventType::OrderCanceled,
            EventPayload::OrderCanceled {
                reason: "customer left".to_string(),
                table_released: true,
            },
        );

        OrderCanceledApplier.apply(&mut record, &event);

        assert_eq!(record.status, OrderStatus::Canceled);
        assert_eq!(record.cancel_reason.as_deref(), Some("customer left"));
        assert!(record.status.is_terminal());
    }
}
