//! Event applier implementations.
//!
//! Each applier folds one event type into the order record. Appliers are
//! PURE functions: rebuilding a record from its event stream must be
//! deterministic, so they never read external state.

use enum_dispatch::enum_dispatch;

use shared::order::{EventPayload, OrderEvent};

mod courier_assigned;
mod items_appended;
mod order_accepted;
mod order_canceled;
mod order_created;
mod order_delivered;
mod order_ready;
mod order_rejected;
mod payment_recorded;

pub use courier_assigned::CourierAssignedApplier;
pub use items_appended::ItemsAppendedApplier;
pub use order_accepted::OrderAcceptedApplier;
pub use order_canceled::OrderCanceledApplier;
pub use order_created::OrderCreatedApplier;
pub use order_delivered::OrderDeliveredApplier;
pub use order_ready::OrderReadyApplier;
pub use order_rejected::OrderRejectedApplier;
pub use payment_recorded::PaymentRecordedApplier;

/// EventAction enum - dispatches to concrete applier implementations
#[enum_dispatch(EventApplier)]
pub enum EventAction {
    OrderCreated(OrderCreatedApplier),
    ItemsAppended(ItemsAppendedApplier),
    OrderAccepted(OrderAcceptedApplier),
    OrderReady(OrderReadyApplier),
    OrderRejected(OrderRejectedApplier),
    OrderCanceled(OrderCanceledApplier),
    CourierAssigned(CourierAssignedApplier),
    PaymentRecorded(PaymentRecordedApplier),
    OrderDelivered(OrderDeliveredApplier),
}

/// Convert OrderEvent reference to EventAction
///
/// This is the ONLY place with a match on EventPayload variants.
impl From<&OrderEvent> for EventAction {
    fn from(event: &OrderEvent) -> Self {
        match &event.payload {
            EventPayload::OrderCreated { .. } => EventAction::OrderCreated(OrderCreatedApplier),
            EventPayload::ItemsAppended { .. } => EventAction::ItemsAppended(ItemsAppendedApplier),
            EventPayload::OrderAccepted {} => EventAction::OrderAccepted(OrderAcceptedApplier),
            EventPayload::OrderReady {} => EventAction::OrderReady(OrderReadyApplier),
            EventPayload::OrderRejected { .. } => EventAction::OrderRejected(OrderRejectedApplier),
            EventPayload::OrderCanceled { .. } => EventAction::OrderCanceled(OrderCanceledApplier),
            EventPayload::CourierAssigned { .. } => {
                EventAction::CourierAssigned(CourierAssignedApplier)
            }
            EventPayload::PaymentRecorded { .. } => {
                EventAction::PaymentRecorded(PaymentRecordedApplier)
            }
            EventPayload::OrderDelivered { .. } => {
                EventAction::OrderDelivered(OrderDeliveredApplier)
            }
        }
    }
}
