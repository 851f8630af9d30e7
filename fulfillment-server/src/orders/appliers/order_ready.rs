//! OrderReady event applier.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderRecord, OrderStatus};

pub struct OrderReadyApplier;

impl EventApplier for OrderReadyApplier {
    fn apply(&self, record: &mut OrderRecord, event: &OrderEvent) {
        if let EventPayload::OrderReady {} = &event.payload {
            record.status = OrderStatus::Ready;
            record.updated_at = event.timestamp;
            record.last_sequence = event.sequence;
        }
    }
}
