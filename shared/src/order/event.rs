//! Order events: immutable facts recorded after command processing.

use super::types::{CustomerInfo, Destination, OrderItemSnapshot, PaymentMethod};
use crate::actor::Role;
use serde::{Deserialize, Serialize};

/// Order event, an immutable audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Event unique ID
    pub event_id: String,
    /// Global sequence number, the authoritative ordering for state evolution
    pub sequence: u64,
    /// Order this event belongs to
    pub order_id: String,
    /// Server timestamp (Unix milliseconds), always set at creation
    pub timestamp: i64,
    /// Client timestamp from the originating command, kept for audit;
    /// may differ from server time due to clock skew
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<i64>,
    /// Actor who triggered this event
    pub actor_id: String,
    /// Actor name (snapshot for audit)
    pub actor_name: String,
    pub role: Role,
    /// Command that produced this event
    pub command_id: String,
    pub event_type: OrderEventType,
    pub payload: EventPayload,
}

/// Event type enumeration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    OrderCreated,
    ItemsAppended,
    OrderAccepted,
    OrderReady,
    OrderRejected,
    OrderCanceled,
    CourierAssigned,
    PaymentRecorded,
    OrderDelivered,
}

impl std::fmt::Display for OrderEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderEventType::OrderCreated => write!(f, "ORDER_CREATED"),
            OrderEventType::ItemsAppended => write!(f, "ITEMS_APPENDED"),
            OrderEventType::OrderAccepted => write!(f, "ORDER_ACCEPTED"),
            OrderEventType::OrderReady => write!(f, "ORDER_READY"),
            OrderEventType::OrderRejected => write!(f, "ORDER_REJECTED"),
            OrderEventType::OrderCanceled => write!(f, "ORDER_CANCELED"),
            OrderEventType::CourierAssigned => write!(f, "COURIER_ASSIGNED"),
            OrderEventType::PaymentRecorded => write!(f, "PAYMENT_RECORDED"),
            OrderEventType::OrderDelivered => write!(f, "ORDER_DELIVERED"),
        }
    }
}

/// Event payload variants.
///
/// Events stay server-side (audit stream + record rebuild); clients only
/// ever see `ChangeNotice`s and re-fetch, so carrying the delivery code in
/// `OrderCreated` does not leak it to couriers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    OrderCreated {
        number: u64,
        destination: Destination,
        customer: CustomerInfo,
        items: Vec<OrderItemSnapshot>,
        subtotal: f64,
        total: f64,
        delivery_code: String,
    },
    ItemsAppended {
        items: Vec<OrderItemSnapshot>,
        subtotal: f64,
        total: f64,
    },
    OrderAccepted {},
    OrderReady {},
    OrderRejected {
        reason: String,
    },
    OrderCanceled {
        reason: String,
        /// Whether the dine-in table became free (no other active order
        /// references it), computed inside the same transaction
        table_released: bool,
    },
    CourierAssigned {
        courier_id: String,
    },
    PaymentRecorded {
        payment_id: String,
        shift_id: String,
        method: PaymentMethod,
        amount: f64,
        /// Cash change returned, `max(0, tendered - total)`
        change: f64,
    },
    OrderDelivered {
        table_released: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        courier_id: Option<String>,
    },
}

impl OrderEvent {
    /// Create a new event. Server timestamp is always set here.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        order_id: String,
        actor_id: String,
        actor_name: String,
        role: Role,
        command_id: String,
        client_timestamp: Option<i64>,
        event_type: OrderEventType,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            order_id,
            timestamp: crate::util::now_millis(),
            client_timestamp,
            actor_id,
            actor_name,
            role,
            command_id,
            event_type,
            payload,
        }
    }
}
