//! ItemsAppended event applier.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderRecord};

pub struct ItemsAppendedApplier;

impl EventApplier for ItemsAppendedApplier {
    fn apply(&self, record: &mut OrderRecord, event: &OrderEvent) {
        if let EventPayload::ItemsAppended {
            items,
            subtotal,
            total,
        } = &event.payload
        {
            record.items.extend(items.iter().cloned());
            // Totals were recomputed by the action; the event is authoritative
            record.subtotal = *subtotal;
            record.total = *total;
            record.updated_at = event.timestamp;
            record.last_sequence = event.sequence;
        }
    }
}
