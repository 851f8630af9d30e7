//! OrderDelivered event applier.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderRecord, OrderStatus};

pub struct OrderDeliveredApplier;

impl EventApplier for OrderDeliveredApplier {
    fn apply(&self, record: &mut OrderRecord, event: &OrderEvent) {
        if let EventPayload::OrderDelivered { .. } = &event.payload {
            record.status = OrderStatus::Delivered;
            record.updated_at = event.timestamp;
            record.last_sequence = event.sequence;
        }
    }
}
