//! FulfillmentManager - Core command processing and event generation
//!
//! This module handles:
//! - Command validation and processing
//! - Event generation with global sequence numbers
//! - Persistence to redb (transactional)
//! - Order record updates and ledger projections
//! - Change-notice broadcasting
//!
//! # Command Flow
//!
//! ```text
//! execute_command(cmd)
//!     ├─ 1. Idempotency check (command_id)
//!     ├─ 2. Begin write transaction
//!     ├─ 3. Create CommandContext
//!     ├─ 4. Convert command to action and execute
//!     ├─ 5. Apply events to records via EventApplier
//!     ├─ 6. Persist events, records and ledger rows
//!     ├─ 7. Mark command processed
//!     ├─ 8. Commit transaction
//!     ├─ 9. Broadcast change notices
//!     └─ 10. Return response
//! ```

mod error;
pub use error::*;

use super::actions::CommandAction;
use super::appliers::EventAction;
use super::storage::{OrderStorage, StorageError};
use super::traits::{CommandContext, CommandHandler, CommandMetadata, EventApplier};
use crate::config::ServerConfig;
use shared::models::{EarningEntry, Payment};
use shared::order::{EventPayload, OrderCommand, OrderEvent, OrderRecord};
use shared::{ChangeNotice, CommandResponse};
use tokio::sync::broadcast;

/// Change-notice broadcast channel capacity
const NOTICE_CHANNEL_CAPACITY: usize = 4096;

/// FulfillmentManager for command processing
///
/// The `epoch` field is a unique identifier generated on each startup.
/// Clients use it to detect server restarts and trigger a full resync.
pub struct FulfillmentManager {
    storage: OrderStorage,
    notice_tx: broadcast::Sender<ChangeNotice>,
    /// Server instance epoch - unique ID generated on startup
    epoch: String,
    venue_id: String,
}

impl std::fmt::Debug for FulfillmentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FulfillmentManager")
            .field("storage", &"<OrderStorage>")
            .field("notice_tx", &"<broadcast::Sender>")
            .field("epoch", &self.epoch)
            .field("venue_id", &self.venue_id)
            .finish()
    }
}

impl FulfillmentManager {
    /// Create a new FulfillmentManager from the server configuration
    pub fn new(config: &ServerConfig) -> ManagerResult<Self> {
        let storage = OrderStorage::open(&config.db_path)?;
        let capacity = config.channel_capacity.max(NOTICE_CHANNEL_CAPACITY);
        let (notice_tx, _) = broadcast::channel(capacity);
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, venue_id = %config.venue_id, "FulfillmentManager started with new epoch");
        Ok(Self {
            storage,
            notice_tx,
            epoch,
            venue_id: config.venue_id.clone(),
        })
    }

    /// Create a FulfillmentManager with existing storage
    pub fn with_storage(storage: OrderStorage, venue_id: impl Into<String>) -> Self {
        let (notice_tx, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        Self {
            storage,
            notice_tx,
            epoch,
            venue_id: venue_id.into(),
        }
    }

    /// Get the server epoch (unique instance ID)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// Subscribe to change-notice broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeNotice> {
        self.notice_tx.subscribe()
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    /// Execute a command and return the response
    pub fn execute_command(&self, cmd: OrderCommand) -> CommandResponse {
        match self.process_command(cmd.clone()) {
            Ok((response, notices)) => {
                // Broadcast after successful commit; notices are payload-free
                // re-fetch triggers, a lagging receiver just re-syncs
                for notice in notices {
                    if self.notice_tx.send(notice).is_err() {
                        tracing::debug!("Change broadcast skipped: no active receivers");
                        break;
                    }
                }
                response
            }
            Err(err) => CommandResponse::error(cmd.command_id, err.into()),
        }
    }

    /// Process command and return response with change notices
    ///
    /// Uses the action-based architecture:
    /// 1. Convert command to CommandAction
    /// 2. Execute action to generate events
    /// 3. Apply events to records via EventApplier
    /// 4. Persist everything atomically
    fn process_command(
        &self,
        cmd: OrderCommand,
    ) -> ManagerResult<(CommandResponse, Vec<ChangeNotice>)> {
        tracing::debug!(command_id = %cmd.command_id, payload = ?cmd.payload, "Processing command");

        // 1. Idempotency check (before transaction)
        if self.storage.is_command_processed(&cmd.command_id)? {
            tracing::warn!(command_id = %cmd.command_id, "Duplicate command");
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        // 2. Begin write transaction
        let txn = self.storage.begin_write()?;

        // Double-check idempotency within the transaction
        if self
            .storage
            .is_command_processed_txn(&txn, &cmd.command_id)?
        {
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        // 3. Get current sequence for context initialization
        let current_sequence = self.storage.get_current_sequence()?;

        // 4. Create context and metadata
        let mut ctx = CommandContext::new(&txn, &self.storage, current_sequence);
        let metadata = CommandMetadata {
            command_id: cmd.command_id.clone(),
            actor_id: cmd.actor_id.clone(),
            actor_name: cmd.actor_name.clone(),
            role: cmd.role,
            timestamp: cmd.timestamp,
        };

        // 5. Convert to action and execute
        let action: CommandAction = (&cmd).into();
        let events = futures::executor::block_on(action.execute(&mut ctx, &metadata))
            .map_err(ManagerError::from)?;

        // 6. Apply events to order records
        for event in &events {
            let mut record = ctx
                .load_record(&event.order_id)
                .unwrap_or_else(|_| OrderRecord::new(event.order_id.clone()));

            let applier: EventAction = event.into();
            applier.apply(&mut record, event);

            ctx.save_record(record);
        }

        // 7. Persist events
        for event in &events {
            self.storage.store_event(&txn, event)?;
        }

        // 8. Persist records and maintain the active-order index
        let mut records: Vec<OrderRecord> = ctx.modified_records().cloned().collect();
        records.sort_by(|a, b| a.order_id.cmp(&b.order_id));
        for record in &records {
            self.storage.store_record(&txn, record)?;
            if record.status.is_terminal() {
                self.storage.mark_order_inactive(&txn, &record.order_id)?;
            } else {
                self.storage.mark_order_active(&txn, &record.order_id)?;
            }
        }

        // 9. Project ledger rows from the emitted events, in the same
        // transaction: the Payment row and the paid flag land atomically.
        for event in &events {
            match &event.payload {
                EventPayload::PaymentRecorded {
                    payment_id,
                    shift_id,
                    method,
                    amount,
                    change,
                } => {
                    self.storage.store_payment(
                        &txn,
                        &Payment {
                            payment_id: payment_id.clone(),
                            order_id: event.order_id.clone(),
                            shift_id: shift_id.clone(),
                            method: *method,
                            amount: *amount,
                            change: *change,
                            recorded_at: event.timestamp,
                        },
                    )?;
                }
                EventPayload::OrderDelivered {
                    courier_id: Some(courier_id),
                    ..
                } => {
                    let amount = records
                        .iter()
                        .find(|r| r.order_id == event.order_id)
                        .map(|r| r.total)
                        .unwrap_or(0.0);
                    self.storage.store_earning(
                        &txn,
                        &EarningEntry {
                            order_id: event.order_id.clone(),
                            courier_id: courier_id.clone(),
                            amount,
                            delivered_at: event.timestamp,
                            settled: false,
                        },
                    )?;
                }
                _ => {}
            }
        }

        // 10. Update sequence counter
        let max_sequence = events
            .iter()
            .map(|e| e.sequence)
            .max()
            .unwrap_or(current_sequence);
        if max_sequence > current_sequence {
            self.storage.set_sequence(&txn, max_sequence)?;
        }

        // 11. Mark command processed
        self.storage.mark_command_processed(&txn, &cmd.command_id)?;

        // 12. Commit transaction
        txn.commit().map_err(StorageError::from)?;

        // 13. Build change notices (payload-free; clients re-fetch)
        let notices: Vec<ChangeNotice> = events
            .iter()
            .map(|event| {
                let number = records
                    .iter()
                    .find(|r| r.order_id == event.order_id)
                    .map(|r| r.number)
                    .unwrap_or(0);
                ChangeNotice {
                    venue_id: self.venue_id.clone(),
                    order_id: event.order_id.clone(),
                    number,
                    kind: event.event_type,
                    sequence: event.sequence,
                }
            })
            .collect();

        let order_id = events.first().map(|e| e.order_id.clone());
        tracing::info!(command_id = %cmd.command_id, order_id = ?order_id, event_count = events.len(), "Command processed successfully");
        Ok((CommandResponse::success(cmd.command_id, order_id), notices))
    }

    // ========== Public Query Methods ==========

    /// Get an order record by ID
    pub fn get_record(&self, order_id: &str) -> ManagerResult<Option<OrderRecord>> {
        Ok(self.storage.get_record(order_id)?)
    }

    /// Get all active (non-terminal) order records
    pub fn get_active_orders(&self) -> ManagerResult<Vec<OrderRecord>> {
        Ok(self.storage.get_active_orders()?)
    }

    /// Get current sequence number
    pub fn get_current_sequence(&self) -> ManagerResult<u64> {
        Ok(self.storage.get_current_sequence()?)
    }

    /// Get events since a given sequence
    pub fn get_events_since(&self, since_sequence: u64) -> ManagerResult<Vec<OrderEvent>> {
        Ok(self.storage.get_events_since(since_sequence)?)
    }

    /// Get all events for a specific order
    pub fn get_events_for_order(&self, order_id: &str) -> ManagerResult<Vec<OrderEvent>> {
        Ok(self.storage.get_events_for_order(order_id)?)
    }

    /// Rebuild an order record from its events (for verification)
    ///
    /// Folds the event stream through the appliers; the result must equal
    /// the stored record.
    pub fn rebuild_record(&self, order_id: &str) -> ManagerResult<OrderRecord> {
        let events = self.storage.get_events_for_order(order_id)?;
        if events.is_empty() {
            return Err(ManagerError::Internal(format!(
                "no events for order {order_id}"
            )));
        }

        let mut record = OrderRecord::new(order_id.to_string());
        for event in &events {
            let applier: EventAction = event.into();
            applier.apply(&mut record, event);
        }

        Ok(record)
    }
}

// Make FulfillmentManager Clone-able
impl Clone for FulfillmentManager {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            notice_tx: self.notice_tx.clone(),
            epoch: self.epoch.clone(),
            venue_id: self.venue_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests;
