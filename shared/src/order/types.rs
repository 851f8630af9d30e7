//! Supporting order types shared by commands, events and the record.

use serde::{Deserialize, Serialize};

/// Order kind, derived from the destination variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    DineIn,
    Delivery,
    Pickup,
}

impl std::fmt::Display for OrderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderKind::DineIn => write!(f, "DINE_IN"),
            OrderKind::Delivery => write!(f, "DELIVERY"),
            OrderKind::Pickup => write!(f, "PICKUP"),
        }
    }
}

/// Structured delivery address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryAddress {
    pub street: String,
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    pub neighborhood: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Where the order goes, tagged per order kind.
///
/// Dine-in carries a table reference, delivery a structured address,
/// pickup nothing. There is deliberately no open-ended metadata blob.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Destination {
    DineIn {
        table_id: String,
        table_label: String,
    },
    Delivery {
        address: DeliveryAddress,
    },
    Pickup,
}

impl Destination {
    pub fn kind(&self) -> OrderKind {
        match self {
            Destination::DineIn { .. } => OrderKind::DineIn,
            Destination::Delivery { .. } => OrderKind::Delivery,
            Destination::Pickup => OrderKind::Pickup,
        }
    }

    /// Table this order occupies, if dine-in.
    pub fn table_id(&self) -> Option<&str> {
        match self {
            Destination::DineIn { table_id, .. } => Some(table_id),
            _ => None,
        }
    }
}

/// Customer identity and contact snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CustomerInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Item input at order creation / append time.
///
/// Name and unit price are snapshotted from the catalog by the caller;
/// later catalog changes never touch existing orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
    /// Free-text preparation note for the kitchen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Item as recorded on the order. Immutable once the order leaves pending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItemSnapshot {
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
    /// Computed line total (unit_price * quantity, 2dp)
    pub line_total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Payment method enumeration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Credit,
    Debit,
    Pix,
    Cash,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Credit => write!(f, "CREDIT"),
            PaymentMethod::Debit => write!(f, "DEBIT"),
            PaymentMethod::Pix => write!(f, "PIX"),
            PaymentMethod::Cash => write!(f, "CASH"),
        }
    }
}

/// Payment input for recordPayment.
///
/// For cash, `amount` is the tendered cash and change is computed as
/// `max(0, tendered - total)`. For every other method the amount must
/// match the order total exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    pub method: PaymentMethod,
    pub amount: f64,
}
