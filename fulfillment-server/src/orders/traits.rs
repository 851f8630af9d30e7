//! Command handling traits and the order-level error type.
//!
//! `CommandHandler` implementations validate a command against the
//! current state and emit events; `EventApplier` implementations are
//! pure functions folding one event into an [`OrderRecord`]. Both run
//! inside the write transaction held by [`CommandContext`].

use crate::orders::appliers::{
    CourierAssignedApplier, EventAction, ItemsAppendedApplier, OrderAcceptedApplier,
    OrderCanceledApplier, OrderCreatedApplier, OrderDeliveredApplier, OrderReadyApplier,
    OrderRejectedApplier, PaymentRecordedApplier,
};
use crate::orders::storage::{OrderStorage, StorageError};
use async_trait::async_trait;
use enum_dispatch::enum_dispatch;
use redb::WriteTransaction;
use shared::actor::Role;
use shared::models::{CashierShift, Courier};
use shared::order::{OrderEvent, OrderRecord, OrderStatus};
use std::collections::HashMap;
use thiserror::Error;

/// Domain errors raised while executing a command.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// The operation is never legal from this status (terminal, or a
    /// status the operation does not admit at all).
    #[error("Cannot {action} while order is {status}")]
    InvalidState {
        status: OrderStatus,
        action: &'static str,
    },

    /// Precondition status mismatch caused by a concurrent actor.
    /// Safe to retry after re-reading the order.
    #[error("Expected status {expected}, found {actual}")]
    StaleTransition {
        expected: OrderStatus,
        actual: OrderStatus,
    },

    #[error("Order {order_id} already claimed by courier {courier_id}")]
    AlreadyClaimed {
        order_id: String,
        courier_id: String,
    },

    #[error("Order {0} payment is already settled")]
    PaymentSettled(String),

    #[error("Payment mismatch: {0}")]
    PaymentMismatch(String),

    #[error("Delivery code does not match")]
    InvalidDeliveryCode,

    #[error("Operator {0} already has an open shift")]
    ShiftAlreadyOpen(String),

    #[error("Shift not found: {0}")]
    ShiftNotFound(String),

    #[error("Shift {0} is closed")]
    ShiftClosed(String),

    #[error("Courier not found: {0}")]
    CourierNotFound(String),

    #[error("Courier {0} is inactive")]
    CourierInactive(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("A reason is required to {0}")]
    ReasonRequired(&'static str),

    #[error("Order {0} is not a delivery order")]
    NotDelivery(String),

    #[error("Role {role} is not allowed to {action}")]
    Unauthorized { role: Role, action: &'static str },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Command metadata extracted from the submitting command.
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub actor_id: String,
    pub actor_name: String,
    pub role: Role,
    pub timestamp: i64,
}

/// Execution context for command handlers.
///
/// Wraps the open write transaction, tracks the sequence counter, and
/// buffers modified records so a handler always sees its own writes.
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a OrderStorage,
    sequence: u64,
    modified: HashMap<String, OrderRecord>,
}

impl<'a> CommandContext<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a OrderStorage, current_sequence: u64) -> Self {
        Self {
            txn,
            storage,
            sequence: current_sequence,
            modified: HashMap::new(),
        }
    }

    /// Allocate the next global sequence number.
    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Highest sequence allocated so far.
    pub fn max_sequence(&self) -> u64 {
        self.sequence
    }

    /// Load an order record, preferring this command's pending writes.
    pub fn load_record(&self, order_id: &str) -> Result<OrderRecord, OrderError> {
        if let Some(record) = self.modified.get(order_id) {
            return Ok(record.clone());
        }
        self.storage
            .get_record_txn(self.txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    /// Buffer a modified record for persistence after event application.
    pub fn save_record(&mut self, record: OrderRecord) {
        self.modified.insert(record.order_id.clone(), record);
    }

    /// Records modified during this command.
    pub fn modified_records(&self) -> impl Iterator<Item = &OrderRecord> {
        self.modified.values()
    }

    /// Allocate the next venue-wide order number.
    pub fn next_order_number(&self) -> Result<u64, OrderError> {
        Ok(self.storage.next_order_number(self.txn)?)
    }

    /// Load a shift, failing with `ShiftNotFound` when absent.
    pub fn shift(&self, shift_id: &str) -> Result<CashierShift, OrderError> {
        self.storage
            .get_shift_txn(self.txn, shift_id)?
            .ok_or_else(|| OrderError::ShiftNotFound(shift_id.to_string()))
    }

    /// Load a courier, failing with `CourierNotFound` when absent.
    pub fn courier(&self, courier_id: &str) -> Result<Courier, OrderError> {
        self.storage
            .get_courier_txn(self.txn, courier_id)?
            .ok_or_else(|| OrderError::CourierNotFound(courier_id.to_string()))
    }

    /// Whether any active order other than `excluding` still references
    /// the table. Used to decide table release on cancel/settlement.
    pub fn table_still_referenced(
        &self,
        table_id: &str,
        excluding: &str,
    ) -> Result<bool, OrderError> {
        Ok(self
            .storage
            .active_order_for_table_txn(self.txn, table_id, excluding)?
            .is_some())
    }
}

/// Command handler trait - implemented by all command actions
#[async_trait]
pub trait CommandHandler {
    /// Validate against current state and emit events. Must not write
    /// to storage directly; all persistence happens in the manager.
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError>;
}

/// Event applier trait - pure fold of one event into the record
#[enum_dispatch]
pub trait EventApplier {
    fn apply(&self, record: &mut OrderRecord, event: &OrderEvent);
}
