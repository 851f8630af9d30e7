//! CourierAssigned event applier.
//!
//! Status stays `Ready`; the claim only sets the exclusive handler.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderRecord};

pub struct CourierAssignedApplier;

impl EventApplier for CourierAssignedApplier {
    fn apply(&self, record: &mut OrderRecord, event: &OrderEvent) {
        if let EventPayload::CourierAssigned { courier_id } = &event.payload {
            record.courier_id = Some(courier_id.clone());
            record.updated_at = event.timestamp;
            record.last_sequence = event.sequence;
        }
    }
}
