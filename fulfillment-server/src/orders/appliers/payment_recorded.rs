//! PaymentRecorded event applier.
//!
//! Flips the payment fields only. The status transition to `Delivered`
//! is its own event: delivery orders stay `Ready` until the courier
//! proves delivery, even when prepaid.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderRecord, PaymentStatus};

pub struct PaymentRecordedApplier;

impl EventApplier for PaymentRecordedApplier {
    fn apply(&self, record: &mut OrderRecord, event: &OrderEvent) {
        if let EventPayload::PaymentRecorded { method, .. } = &event.payload {
            record.payment_status = PaymentStatus::Paid;
            record.payment_method = Some(*method);
            record.updated_at = event.timestamp;
            record.last_sequence = event.sequence;
        }
    }
}
