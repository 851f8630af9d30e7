//! Commands submitted by role-views.

use super::types::{CustomerInfo, Destination, OrderItemInput, PaymentInput};
use crate::actor::Role;
use serde::{Deserialize, Serialize};

/// Command envelope.
///
/// `command_id` is client-generated and used for idempotency: retrying a
/// command after a dropped connection is acknowledged, never re-executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCommand {
    pub command_id: String,
    /// Authenticated actor id from the identity provider
    pub actor_id: String,
    /// Actor display name (snapshot for audit)
    pub actor_name: String,
    /// Role claim, trusted for transition authorization
    pub role: Role,
    /// Client timestamp (Unix milliseconds), kept for audit only
    pub timestamp: i64,
    pub payload: OrderCommandPayload,
}

impl OrderCommand {
    pub fn new(actor_id: &str, actor_name: &str, role: Role, payload: OrderCommandPayload) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            actor_id: actor_id.to_string(),
            actor_name: actor_name.to_string(),
            role,
            timestamp: crate::util::now_millis(),
            payload,
        }
    }
}

/// Command payload variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderCommandPayload {
    /// Create an order in `Pending`
    CreateOrder {
        destination: Destination,
        customer: CustomerInfo,
        items: Vec<OrderItemInput>,
    },
    /// Append items; legal only while `Pending`
    AppendItems {
        order_id: String,
        items: Vec<OrderItemInput>,
    },
    /// `Pending → Preparing` (counter or kitchen)
    AcceptOrder { order_id: String },
    /// `Preparing → Ready` (kitchen)
    MarkReady { order_id: String },
    /// `Pending|Preparing → Canceled`, reason required
    RejectOrder { order_id: String, reason: String },
    /// `Ready → Canceled`, reason required, frees the table
    CancelOrder { order_id: String, reason: String },
    /// Assign a courier; at-most-one-winner claim arbitration
    ClaimOrder {
        order_id: String,
        courier_id: String,
    },
    /// Settle payment against an open shift; atomically inserts the
    /// Payment row, marks the order paid, and (for dine-in/pickup)
    /// transitions it to `Delivered`
    RecordPayment {
        order_id: String,
        shift_id: String,
        payment: PaymentInput,
    },
    /// Proof-of-delivery: match the code, settle cash-on-delivery if the
    /// order is still unpaid, transition to `Delivered`
    VerifyDelivery {
        order_id: String,
        code: String,
        /// Open shift to post a cash-on-delivery payment against;
        /// required only when the order is unpaid
        #[serde(skip_serializing_if = "Option::is_none")]
        shift_id: Option<String>,
    },
}

impl OrderCommandPayload {
    /// Order this command targets, if it targets an existing one.
    pub fn order_id(&self) -> Option<&str> {
        match self {
            OrderCommandPayload::CreateOrder { .. } => None,
            OrderCommandPayload::AppendItems { order_id, .. }
            | OrderCommandPayload::AcceptOrder { order_id }
            | OrderCommandPayload::MarkReady { order_id }
            | OrderCommandPayload::RejectOrder { order_id, .. }
            | OrderCommandPayload::CancelOrder { order_id, .. }
            | OrderCommandPayload::ClaimOrder { order_id, .. }
            | OrderCommandPayload::RecordPayment { order_id, .. }
            | OrderCommandPayload::VerifyDelivery { order_id, .. } => Some(order_id),
        }
    }
}
