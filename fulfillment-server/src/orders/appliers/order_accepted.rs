//! OrderAccepted event applier.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderRecord, OrderStatus};

pub struct OrderAcceptedApplier;

impl EventApplier for OrderAcceptedApplier {
    fn apply(&self, record: &mut OrderRecord, event: &OrderEvent) {
        if let EventPayload::OrderAccepted {} = &event.payload {
            record.status = OrderStatus::Preparing;
            record.updated_at = event.timestamp;
            record.last_sequence = event.sequence;
        }
    }
}
