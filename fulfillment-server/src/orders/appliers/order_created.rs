//! OrderCreated event applier.
//!
//! Initializes the record from the creation payload. Everything the
//! record needs to be rebuilt lives in the event, including the
//! delivery code.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderRecord, OrderStatus};

pub struct OrderCreatedApplier;

impl EventApplier for OrderCreatedApplier {
    fn apply(&self, record: &mut OrderRecord, event: &OrderEvent) {
        if let EventPayload::OrderCreated {
            number,
            destination,
            customer,
            items,
            subtotal,
            total,
            delivery_code,
        } = &event.payload
        {
            record.number = *number;
            record.destination = destination.clone();
            record.customer = customer.clone();
            record.items = items.clone();
            record.subtotal = *subtotal;
            record.total = *total;
            record.delivery_code = delivery_code.clone();
            record.status = OrderStatus::Pending;
            record.created_at = event.timestamp;
            record.updated_at = event.timestamp;
            record.last_sequence = event.sequence;
        }
    }
}
