//! Order domain types: commands in, events out, record in the middle.

pub mod command;
pub mod event;
pub mod record;
pub mod types;

pub use command::{OrderCommand, OrderCommandPayload};
pub use event::{EventPayload, OrderEvent, OrderEventType};
pub use record::{OrderRecord, OrderStatus, PaymentStatus};
pub use types::{
    CustomerInfo, DeliveryAddress, Destination, OrderItemInput, OrderItemSnapshot, OrderKind,
    PaymentInput, PaymentMethod,
};
