//! The order record: authoritative state computed from the event stream.

use super::types::{CustomerInfo, Destination, OrderItemSnapshot, OrderKind, PaymentMethod};
use serde::{Deserialize, Serialize};

/// Order status.
///
/// Transitions are monotonic along `Pending → Preparing → Ready →
/// Delivered`, with explicit reject/cancel escapes into `Canceled` from
/// the non-terminal states. See the state machine for who may trigger what.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Delivered,
    Canceled,
}

impl OrderStatus {
    /// Terminal statuses admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Canceled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Preparing => write!(f, "PREPARING"),
            OrderStatus::Ready => write!(f, "READY"),
            OrderStatus::Delivered => write!(f, "DELIVERED"),
            OrderStatus::Canceled => write!(f, "CANCELED"),
        }
    }
}

/// Payment settlement status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

/// Order record, the single source of truth for one order's state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRecord {
    /// Order ID (assigned by server)
    pub order_id: String,
    /// Human-readable sequence number, monotonically increasing per venue
    pub number: u64,
    /// Destination (carries the order kind)
    pub destination: Destination,
    pub status: OrderStatus,
    pub customer: CustomerInfo,
    pub items: Vec<OrderItemSnapshot>,
    pub subtotal: f64,
    #[serde(default)]
    pub discount: f64,
    pub total: f64,
    pub payment_status: PaymentStatus,
    /// Method of the settling payment, set when paid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    /// Assigned courier, set by a won claim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courier_id: Option<String>,
    /// Proof-of-delivery code, generated at creation. Revealed to the
    /// customer out-of-band; never included in courier-facing views.
    pub delivery_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    /// Last applied event sequence
    pub last_sequence: u64,
}

impl OrderRecord {
    /// Empty placeholder; real fields arrive with the creation event.
    pub fn new(order_id: String) -> Self {
        Self {
            order_id,
            number: 0,
            destination: Destination::Pickup,
            status: OrderStatus::Pending,
            customer: CustomerInfo::default(),
            items: Vec::new(),
            subtotal: 0.0,
            discount: 0.0,
            total: 0.0,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            courier_id: None,
            delivery_code: String::new(),
            cancel_reason: None,
            created_at: 0,
            updated_at: 0,
            last_sequence: 0,
        }
    }

    pub fn kind(&self) -> OrderKind {
        self.destination.kind()
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Elapsed milliseconds since creation, for operator attention.
    ///
    /// "Late" is a read-time property, never an automatic transition.
    pub fn age_millis(&self, now: i64) -> i64 {
        (now - self.created_at).max(0)
    }

    /// Whether a claim could currently succeed.
    pub fn is_claimable(&self) -> bool {
        self.kind() == OrderKind::Delivery
            && self.status == OrderStatus::Ready
            && self.courier_id.is_none()
    }
}
