//! OrderRejected event applier.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderRecord, OrderStatus};

pub struct OrderRejectedApplier;

impl EventApplier for OrderRejectedApplier {
    fn apply(&self, record: &mut OrderRecord, event: &OrderEvent) {
        if let EventPayload::OrderRejected { reason } = &event.payload {
            record.status = OrderStatus::Canceled;
            record.cancel_reason = Some(reason.clone());
            record.updated_at = event.timestamp;
            record.last_sequence = event.sequence;
        }
    }
}
