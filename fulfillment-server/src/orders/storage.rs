//! redb-based storage for the fulfillment core.
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `events` | `(order_id, sequence)` | `OrderEvent` | Event stream (append-only) |
//! | `orders` | `order_id` | `OrderRecord` | Authoritative order state |
//! | `active_orders` | `order_id` | `()` | Non-terminal order index |
//! | `processed_commands` | `command_id` | `()` | Idempotency check |
//! | `counters` | name | `u64` | Global sequence, order numbers |
//! | `shifts` | `shift_id` | `CashierShift` | Cash sessions |
//! | `payments` | `payment_id` | `Payment` | Settlement ledger rows |
//! | `couriers` | `courier_id` | `Courier` | Courier registry |
//! | `courier_earnings` | `order_id` | `EarningEntry` | Delivery payout rows |
//!
//! Every multi-effect operation (payment settlement, claim, cancel)
//! runs inside one `WriteTransaction`; redb's single-writer
//! serialization is what arbitrates concurrent actors. Shift summaries
//! and earnings totals are always derived reads over the ledger rows,
//! never stored running totals.

use redb::{
    Database, ReadableTable, TableDefinition, WriteTransaction,
};
use shared::models::{CashierShift, Courier, EarningEntry, Payment, ShiftStatus};
use shared::order::{OrderEvent, OrderRecord};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Event stream: key = (order_id, sequence), value = JSON-serialized OrderEvent
const EVENTS_TABLE: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("events");

/// Order records: key = order_id, value = JSON-serialized OrderRecord
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Active (non-terminal) orders: key = order_id, value = empty (existence check)
const ACTIVE_ORDERS_TABLE: TableDefinition<&str, ()> = TableDefinition::new("active_orders");

/// Processed commands: key = command_id, value = empty (idempotency)
const PROCESSED_COMMANDS_TABLE: TableDefinition<&str, ()> =
    TableDefinition::new("processed_commands");

/// Counters: key = "seq" or "order_number", value = u64
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

/// Cashier shifts: key = shift_id, value = JSON-serialized CashierShift
const SHIFTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("shifts");

/// Payments: key = payment_id, value = JSON-serialized Payment
const PAYMENTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("payments");

/// Couriers: key = courier_id, value = JSON-serialized Courier
const COURIERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("couriers");

/// Courier earnings: key = order_id, value = JSON-serialized EarningEntry
const EARNINGS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("courier_earnings");

const SEQUENCE_KEY: &str = "seq";
const ORDER_NUMBER_KEY: &str = "order_number";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Fulfillment storage backed by redb.
///
/// Commits are durable as soon as `commit()` returns; the database file
/// is always in a consistent state after power loss.
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl OrderStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    fn init_tables(&self) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let _ = txn.open_table(EVENTS_TABLE)?;
            let _ = txn.open_table(ORDERS_TABLE)?;
            let _ = txn.open_table(ACTIVE_ORDERS_TABLE)?;
            let _ = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
            let _ = txn.open_table(SHIFTS_TABLE)?;
            let _ = txn.open_table(PAYMENTS_TABLE)?;
            let _ = txn.open_table(COURIERS_TABLE)?;
            let _ = txn.open_table(EARNINGS_TABLE)?;

            let mut counters = txn.open_table(COUNTERS_TABLE)?;
            if counters.get(SEQUENCE_KEY)?.is_none() {
                counters.insert(SEQUENCE_KEY, 0u64)?;
            }
            if counters.get(ORDER_NUMBER_KEY)?.is_none() {
                counters.insert(ORDER_NUMBER_KEY, 0u64)?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Counters ==========

    /// Get current sequence (read-only)
    pub fn get_current_sequence(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COUNTERS_TABLE)?;
        Ok(table
            .get(SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0))
    }

    /// Set sequence number (within transaction)
    pub fn set_sequence(&self, txn: &WriteTransaction, sequence: u64) -> StorageResult<()> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        table.insert(SEQUENCE_KEY, sequence)?;
        Ok(())
    }

    /// Increment and return the venue-wide order number (within transaction).
    ///
    /// Allocated inside the creating command's transaction, so a failed
    /// create never burns a number.
    pub fn next_order_number(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        let current = table
            .get(ORDER_NUMBER_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0);
        let next = current + 1;
        table.insert(ORDER_NUMBER_KEY, next)?;
        Ok(next)
    }

    // ========== Command Idempotency ==========

    /// Check if a command has been processed
    pub fn is_command_processed(&self, command_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Check if a command has been processed (within transaction)
    pub fn is_command_processed_txn(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<bool> {
        let table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        let processed = table.get(command_id)?.is_some();
        Ok(processed)
    }

    /// Mark a command as processed
    pub fn mark_command_processed(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        table.insert(command_id, ())?;
        Ok(())
    }

    // ========== Event Operations ==========

    /// Store an event
    pub fn store_event(&self, txn: &WriteTransaction, event: &OrderEvent) -> StorageResult<()> {
        let mut table = txn.open_table(EVENTS_TABLE)?;
        let key = (event.order_id.as_str(), event.sequence);
        let value = serde_json::to_vec(event)?;
        table.insert(key, value.as_slice())?;
        Ok(())
    }

    /// Get all events for an order, ordered by sequence
    pub fn get_events_for_order(&self, order_id: &str) -> StorageResult<Vec<OrderEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENTS_TABLE)?;

        let mut events = Vec::new();
        let range_start = (order_id, 0u64);
        let range_end = (order_id, u64::MAX);

        for result in table.range(range_start..=range_end)? {
            let (_key, value) = result?;
            let event: OrderEvent = serde_json::from_slice(value.value())?;
            events.push(event);
        }

        events.sort_by_key(|e| e.sequence);
        Ok(events)
    }

    /// Get events since a given sequence (across all orders)
    pub fn get_events_since(&self, since_sequence: u64) -> StorageResult<Vec<OrderEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENTS_TABLE)?;

        let mut events = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let event: OrderEvent = serde_json::from_slice(value.value())?;
            if event.sequence > since_sequence {
                events.push(event);
            }
        }

        events.sort_by_key(|e| e.sequence);
        Ok(events)
    }

    // ========== Order Records ==========

    /// Store an order record
    pub fn store_record(&self, txn: &WriteTransaction, record: &OrderRecord) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(record)?;
        table.insert(record.order_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get an order record (read-only)
    pub fn get_record(&self, order_id: &str) -> StorageResult<Option<OrderRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get an order record (within transaction)
    pub fn get_record_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<OrderRecord>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        let record = match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        };
        record
    }

    // ========== Active Orders ==========

    /// Mark an order as active
    pub fn mark_order_active(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        table.insert(order_id, ())?;
        Ok(())
    }

    /// Mark an order as inactive
    pub fn mark_order_inactive(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        table.remove(order_id)?;
        Ok(())
    }

    /// Check if an order is active
    pub fn is_order_active(&self, order_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;
        Ok(table.get(order_id)?.is_some())
    }

    /// Get all active order IDs
    pub fn get_active_order_ids(&self) -> StorageResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;

        let mut order_ids = Vec::new();
        for result in table.iter()? {
            let (key, _value) = result?;
            order_ids.push(key.value().to_string());
        }
        Ok(order_ids)
    }

    /// Get all active order records
    pub fn get_active_orders(&self) -> StorageResult<Vec<OrderRecord>> {
        let active_ids = self.get_active_order_ids()?;
        let mut records = Vec::new();
        for order_id in active_ids {
            if let Some(record) = self.get_record(&order_id)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Find an active order (other than `excluding`) referencing a table
    /// (within transaction). Table occupancy is derived from this, never
    /// stored independently.
    pub fn active_order_for_table_txn(
        &self,
        txn: &WriteTransaction,
        table_id: &str,
        excluding: &str,
    ) -> StorageResult<Option<String>> {
        let active_table = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let orders_table = txn.open_table(ORDERS_TABLE)?;

        for result in active_table.iter()? {
            let (key, _) = result?;
            let order_id = key.value();
            if order_id == excluding {
                continue;
            }

            if let Some(value) = orders_table.get(order_id)? {
                let record: OrderRecord = serde_json::from_slice(value.value())?;
                if record.destination.table_id() == Some(table_id) {
                    return Ok(Some(order_id.to_string()));
                }
            }
        }
        Ok(None)
    }

    /// Find an active order referencing a table (read-only)
    pub fn active_order_for_table(&self, table_id: &str) -> StorageResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let active_table = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let orders_table = read_txn.open_table(ORDERS_TABLE)?;

        for result in active_table.iter()? {
            let (key, _) = result?;
            let order_id = key.value();

            if let Some(value) = orders_table.get(order_id)? {
                let record: OrderRecord = serde_json::from_slice(value.value())?;
                if record.destination.table_id() == Some(table_id) {
                    return Ok(Some(order_id.to_string()));
                }
            }
        }
        Ok(None)
    }

    // ========== Shifts ==========

    /// Store a shift
    pub fn store_shift(&self, txn: &WriteTransaction, shift: &CashierShift) -> StorageResult<()> {
        let mut table = txn.open_table(SHIFTS_TABLE)?;
        let value = serde_json::to_vec(shift)?;
        table.insert(shift.shift_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get a shift (read-only)
    pub fn get_shift(&self, shift_id: &str) -> StorageResult<Option<CashierShift>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SHIFTS_TABLE)?;
        match table.get(shift_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a shift (within transaction)
    pub fn get_shift_txn(
        &self,
        txn: &WriteTransaction,
        shift_id: &str,
    ) -> StorageResult<Option<CashierShift>> {
        let table = txn.open_table(SHIFTS_TABLE)?;
        let shift = match table.get(shift_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        };
        shift
    }

    /// Find the open shift for an operator (within transaction).
    ///
    /// Enforces the one-open-shift-per-operator invariant at open time.
    pub fn open_shift_for_operator_txn(
        &self,
        txn: &WriteTransaction,
        operator_id: &str,
    ) -> StorageResult<Option<CashierShift>> {
        let table = txn.open_table(SHIFTS_TABLE)?;
        for result in table.iter()? {
            let (_key, value) = result?;
            let shift: CashierShift = serde_json::from_slice(value.value())?;
            if shift.operator_id == operator_id && shift.status == ShiftStatus::Open {
                return Ok(Some(shift));
            }
        }
        Ok(None)
    }

    /// List all shifts
    pub fn list_shifts(&self) -> StorageResult<Vec<CashierShift>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SHIFTS_TABLE)?;

        let mut shifts = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            shifts.push(serde_json::from_slice(value.value())?);
        }
        Ok(shifts)
    }

    // ========== Payments ==========

    /// Store a payment row
    pub fn store_payment(&self, txn: &WriteTransaction, payment: &Payment) -> StorageResult<()> {
        let mut table = txn.open_table(PAYMENTS_TABLE)?;
        let value = serde_json::to_vec(payment)?;
        table.insert(payment.payment_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get all payments recorded against a shift
    pub fn get_payments_for_shift(&self, shift_id: &str) -> StorageResult<Vec<Payment>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PAYMENTS_TABLE)?;

        let mut payments = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let payment: Payment = serde_json::from_slice(value.value())?;
            if payment.shift_id == shift_id {
                payments.push(payment);
            }
        }
        payments.sort_by_key(|p| p.recorded_at);
        Ok(payments)
    }

    /// Get all payments for an order
    pub fn get_payments_for_order(&self, order_id: &str) -> StorageResult<Vec<Payment>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PAYMENTS_TABLE)?;

        let mut payments = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let payment: Payment = serde_json::from_slice(value.value())?;
            if payment.order_id == order_id {
                payments.push(payment);
            }
        }
        Ok(payments)
    }

    // ========== Couriers ==========

    /// Store a courier (within transaction)
    pub fn store_courier_txn(
        &self,
        txn: &WriteTransaction,
        courier: &Courier,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(COURIERS_TABLE)?;
        let value = serde_json::to_vec(courier)?;
        table.insert(courier.courier_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Store a courier in its own transaction
    pub fn store_courier(&self, courier: &Courier) -> StorageResult<()> {
        let txn = self.begin_write()?;
        self.store_courier_txn(&txn, courier)?;
        txn.commit()?;
        Ok(())
    }

    /// Get a courier (read-only)
    pub fn get_courier(&self, courier_id: &str) -> StorageResult<Option<Courier>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COURIERS_TABLE)?;
        match table.get(courier_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a courier (within transaction)
    pub fn get_courier_txn(
        &self,
        txn: &WriteTransaction,
        courier_id: &str,
    ) -> StorageResult<Option<Courier>> {
        let table = txn.open_table(COURIERS_TABLE)?;
        let courier = match table.get(courier_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        };
        courier
    }

    /// List all couriers
    pub fn list_couriers(&self) -> StorageResult<Vec<Courier>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COURIERS_TABLE)?;

        let mut couriers = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            couriers.push(serde_json::from_slice(value.value())?);
        }
        Ok(couriers)
    }

    // ========== Courier Earnings ==========

    /// Store an earning row (within transaction). Keyed by order, so a
    /// replayed delivery event overwrites rather than duplicates.
    pub fn store_earning(&self, txn: &WriteTransaction, entry: &EarningEntry) -> StorageResult<()> {
        let mut table = txn.open_table(EARNINGS_TABLE)?;
        let value = serde_json::to_vec(entry)?;
        table.insert(entry.order_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get the earning row for a delivered order
    pub fn get_earning(&self, order_id: &str) -> StorageResult<Option<EarningEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EARNINGS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Mark all of a courier's earning rows settled, in one transaction.
    /// Idempotent; returns how many rows changed.
    pub fn settle_earnings_for_courier(&self, courier_id: &str) -> StorageResult<usize> {
        let txn = self.begin_write()?;
        let mut settled = 0;
        {
            let mut table = txn.open_table(EARNINGS_TABLE)?;
            let mut updated: Vec<EarningEntry> = Vec::new();
            for result in table.iter()? {
                let (_key, value) = result?;
                let entry: EarningEntry = serde_json::from_slice(value.value())?;
                if entry.courier_id == courier_id && !entry.settled {
                    updated.push(EarningEntry {
                        settled: true,
                        ..entry
                    });
                }
            }
            for entry in &updated {
                let value = serde_json::to_vec(entry)?;
                table.insert(entry.order_id.as_str(), value.as_slice())?;
                settled += 1;
            }
        }
        txn.commit()?;
        Ok(settled)
    }

    /// Get all earning rows for a courier
    pub fn get_earnings_for_courier(&self, courier_id: &str) -> StorageResult<Vec<EarningEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EARNINGS_TABLE)?;

        let mut entries = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let entry: EarningEntry = serde_json::from_slice(value.value())?;
            if entry.courier_id == courier_id {
                entries.push(entry);
            }
        }
        entries.sort_by_key(|e| e.delivered_at);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{Destination, EventPayload, OrderEventType, PaymentMethod};
    use shared::Role;

    fn create_test_event(order_id: &str, sequence: u64) -> OrderEvent {
        OrderEvent::new(
            sequence,
            order_id.to_string(),
            "op-1".to_string(),
            "Test Operator".to_string(),
            Role::Counter,
            uuid::Uuid::new_v4().to_string(),
            Some(1234567890),
            OrderEventType::OrderAccepted,
            EventPayload::OrderAccepted {},
        )
    }

    fn create_test_record(order_id: &str, table_id: Option<&str>) -> OrderRecord {
        let mut record = OrderRecord::new(order_id.to_string());
        record.destination = match table_id {
            Some(tid) => Destination::DineIn {
                table_id: tid.to_string(),
                table_label: format!("Table {tid}"),
            },
            None => Destination::Pickup,
        };
        record
    }

    #[test]
    fn test_order_number_allocation() {
        let storage = OrderStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.next_order_number(&txn).unwrap(), 1);
        assert_eq!(storage.next_order_number(&txn).unwrap(), 2);
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.next_order_number(&txn).unwrap(), 3);
        txn.commit().unwrap();
    }

    #[test]
    fn test_order_number_not_burned_on_abort() {
        let storage = OrderStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.next_order_number(&txn).unwrap(), 1);
        txn.abort().unwrap();

        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.next_order_number(&txn).unwrap(), 1);
        txn.commit().unwrap();
    }

    #[test]
    fn test_command_idempotency() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let command_id = "cmd-123";

        assert!(!storage.is_command_processed(command_id).unwrap());

        let txn = storage.begin_write().unwrap();
        storage.mark_command_processed(&txn, command_id).unwrap();
        txn.commit().unwrap();

        assert!(storage.is_command_processed(command_id).unwrap());
    }

    #[test]
    fn test_event_storage_ordering() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let order_id = "order-1";

        let txn = storage.begin_write().unwrap();
        storage.store_event(&txn, &create_test_event(order_id, 2)).unwrap();
        storage.store_event(&txn, &create_test_event(order_id, 1)).unwrap();
        storage.store_event(&txn, &create_test_event("order-2", 3)).unwrap();
        txn.commit().unwrap();

        let events = storage.get_events_for_order(order_id).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence, 1);
        assert_eq!(events[1].sequence, 2);

        let since = storage.get_events_since(1).unwrap();
        assert_eq!(since.len(), 2);
        assert!(since.iter().all(|e| e.sequence > 1));
    }

    #[test]
    fn test_record_roundtrip() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let record = create_test_record("order-1", Some("T5"));

        let txn = storage.begin_write().unwrap();
        storage.store_record(&txn, &record).unwrap();
        txn.commit().unwrap();

        let loaded = storage.get_record("order-1").unwrap().unwrap();
        assert_eq!(loaded.order_id, "order-1");
        assert_eq!(loaded.destination.table_id(), Some("T5"));
        assert!(storage.get_record("missing").unwrap().is_none());
    }

    #[test]
    fn test_active_order_index() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let order_id = "order-1";

        assert!(!storage.is_order_active(order_id).unwrap());

        let txn = storage.begin_write().unwrap();
        storage.mark_order_active(&txn, order_id).unwrap();
        txn.commit().unwrap();
        assert!(storage.is_order_active(order_id).unwrap());

        let txn = storage.begin_write().unwrap();
        storage.mark_order_inactive(&txn, order_id).unwrap();
        txn.commit().unwrap();
        assert!(!storage.is_order_active(order_id).unwrap());
    }

    #[test]
    fn test_table_occupancy_is_derived() {
        let storage = OrderStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage
            .store_record(&txn, &create_test_record("order-1", Some("T5")))
            .unwrap();
        storage.mark_order_active(&txn, "order-1").unwrap();
        txn.commit().unwrap();

        assert_eq!(
            storage.active_order_for_table("T5").unwrap(),
            Some("order-1".to_string())
        );
        assert!(storage.active_order_for_table("T9").unwrap().is_none());

        // Excluding the only referencing order means the table is free
        let txn = storage.begin_write().unwrap();
        assert!(storage
            .active_order_for_table_txn(&txn, "T5", "order-1")
            .unwrap()
            .is_none());
        txn.abort().unwrap();
    }

    #[test]
    fn test_open_shift_lookup() {
        let storage = OrderStorage::open_in_memory().unwrap();

        let mut shift = CashierShift {
            shift_id: "shift-1".to_string(),
            operator_id: "op-1".to_string(),
            operator_name: "Ana".to_string(),
            status: ShiftStatus::Open,
            opening_float: 50.0,
            opened_at: 1000,
            closed_at: None,
        };

        let txn = storage.begin_write().unwrap();
        storage.store_shift(&txn, &shift).unwrap();
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        assert!(storage
            .open_shift_for_operator_txn(&txn, "op-1")
            .unwrap()
            .is_some());
        assert!(storage
            .open_shift_for_operator_txn(&txn, "op-2")
            .unwrap()
            .is_none());
        txn.abort().unwrap();

        shift.status = ShiftStatus::Closed;
        shift.closed_at = Some(2000);
        let txn = storage.begin_write().unwrap();
        storage.store_shift(&txn, &shift).unwrap();
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        assert!(storage
            .open_shift_for_operator_txn(&txn, "op-1")
            .unwrap()
            .is_none());
        txn.abort().unwrap();
    }

    #[test]
    fn test_payments_by_shift() {
        let storage = OrderStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        for (i, (shift, amount)) in [("shift-1", 25.0), ("shift-1", 10.0), ("shift-2", 99.0)]
            .iter()
            .enumerate()
        {
            let payment = Payment {
                payment_id: format!("pay-{i}"),
                order_id: format!("order-{i}"),
                shift_id: shift.to_string(),
                method: PaymentMethod::Cash,
                amount: *amount,
                change: 0.0,
                recorded_at: i as i64,
            };
            storage.store_payment(&txn, &payment).unwrap();
        }
        txn.commit().unwrap();

        let payments = storage.get_payments_for_shift("shift-1").unwrap();
        assert_eq!(payments.len(), 2);
        assert_eq!(payments.iter().map(|p| p.amount).sum::<f64>(), 35.0);
    }

    #[test]
    fn test_earning_rows_keyed_by_order() {
        let storage = OrderStorage::open_in_memory().unwrap();

        let entry = EarningEntry {
            order_id: "order-1".to_string(),
            courier_id: "courier-1".to_string(),
            amount: 25.0,
            delivered_at: 1000,
            settled: false,
        };

        let txn = storage.begin_write().unwrap();
        storage.store_earning(&txn, &entry).unwrap();
        // Overwrite, not duplicate
        storage.store_earning(&txn, &entry).unwrap();
        txn.commit().unwrap();

        let entries = storage.get_earnings_for_courier("courier-1").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, 25.0);
        assert!(storage.get_earning("order-1").unwrap().is_some());
    }
}
