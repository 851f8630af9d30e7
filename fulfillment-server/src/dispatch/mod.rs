//! Courier dispatch: registry, claimable-order views, positions, earnings.
//!
//! Claim arbitration itself is a command action (the conditional write runs
//! inside the order transaction); this module provides everything around
//! it: who may claim, what they see, where they are, and what they earned.

pub mod tracker;

pub use tracker::PositionTracker;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::orders::money::{to_decimal, to_f64};
use crate::orders::storage::OrderStorage;
use crate::orders::traits::OrderError;
use shared::models::{Courier, CourierEarnings, PositionFix, VehicleType};
use shared::order::{CustomerInfo, DeliveryAddress, Destination};

/// Courier-facing projection of a claimable order.
///
/// Deliberately omits the delivery code: the courier learns it from the
/// customer at handoff, never from the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimableOrder {
    pub order_id: String,
    pub number: u64,
    pub customer: CustomerInfo,
    pub address: DeliveryAddress,
    pub total: f64,
    pub created_at: i64,
}

/// Dispatch service over the shared order storage.
#[derive(Clone)]
pub struct DispatchService {
    storage: OrderStorage,
    tracker: Arc<PositionTracker>,
}

impl DispatchService {
    pub fn new(storage: OrderStorage) -> Self {
        Self {
            storage,
            tracker: Arc::new(PositionTracker::new()),
        }
    }

    // ========== Registry ==========

    /// Register a new courier
    pub fn register_courier(
        &self,
        name: &str,
        vehicle: VehicleType,
    ) -> Result<Courier, OrderError> {
        let courier = Courier {
            courier_id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            vehicle,
            active: true,
            created_at: shared::util::now_millis(),
        };
        self.storage.store_courier(&courier)?;
        tracing::info!(courier_id = %courier.courier_id, name, "Courier registered");
        Ok(courier)
    }

    /// Deactivate a courier. Rows referencing the courier (earnings, past
    /// orders) stay intact; the courier just cannot claim anymore.
    pub fn deactivate_courier(&self, courier_id: &str) -> Result<Courier, OrderError> {
        let txn = self.storage.begin_write()?;
        let mut courier = self
            .storage
            .get_courier_txn(&txn, courier_id)?
            .ok_or_else(|| OrderError::CourierNotFound(courier_id.to_string()))?;
        courier.active = false;
        self.storage.store_courier_txn(&txn, &courier)?;
        txn.commit()
            .map_err(crate::orders::storage::StorageError::from)?;

        self.tracker.remove(courier_id);
        tracing::info!(courier_id, "Courier deactivated");
        Ok(courier)
    }

    /// Get a courier by ID
    pub fn get_courier(&self, courier_id: &str) -> Result<Option<Courier>, OrderError> {
        Ok(self.storage.get_courier(courier_id)?)
    }

    /// List all couriers
    pub fn list_couriers(&self) -> Result<Vec<Courier>, OrderError> {
        Ok(self.storage.list_couriers()?)
    }

    // ========== Claimable view ==========

    /// Orders a courier could claim right now: Ready, unclaimed, delivery.
    pub fn list_claimable(&self) -> Result<Vec<ClaimableOrder>, OrderError> {
        let mut claimable: Vec<ClaimableOrder> = self
            .storage
            .get_active_orders()?
            .into_iter()
            .filter(|record| record.is_claimable())
            .filter_map(|record| match &record.destination {
                Destination::Delivery { address } => Some(ClaimableOrder {
                    order_id: record.order_id.clone(),
                    number: record.number,
                    customer: record.customer.clone(),
                    address: address.clone(),
                    total: record.total,
                    created_at: record.created_at,
                }),
                _ => None,
            })
            .collect();
        claimable.sort_by_key(|o| o.created_at);
        Ok(claimable)
    }

    // ========== Positions ==========

    /// Record a position fix. Fire-and-forget: stale fixes are dropped,
    /// unknown couriers are ignored after a log line.
    pub fn record_position(&self, courier_id: &str, fix: PositionFix) {
        match self.storage.get_courier(courier_id) {
            Ok(Some(courier)) if courier.active => {
                if !self.tracker.record(courier_id, fix) {
                    tracing::debug!(courier_id, recorded_at = fix.recorded_at, "Stale position fix discarded");
                }
            }
            Ok(_) => {
                tracing::debug!(courier_id, "Position fix from unknown or inactive courier ignored");
            }
            Err(e) => {
                tracing::warn!(courier_id, error = %e, "Position fix dropped on storage error");
            }
        }
    }

    /// Last known position for a courier
    pub fn position(&self, courier_id: &str) -> Option<PositionFix> {
        self.tracker.get(courier_id)
    }

    // ========== Earnings ==========

    /// Earnings report for a courier, totals computed at read time.
    pub fn earnings(&self, courier_id: &str) -> Result<CourierEarnings, OrderError> {
        self.storage
            .get_courier(courier_id)?
            .ok_or_else(|| OrderError::CourierNotFound(courier_id.to_string()))?;

        let entries = self.storage.get_earnings_for_courier(courier_id)?;
        let (pending, settled) = entries.iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(pending, settled), entry| {
                if entry.settled {
                    (pending, settled + to_decimal(entry.amount))
                } else {
                    (pending + to_decimal(entry.amount), settled)
                }
            },
        );

        Ok(CourierEarnings {
            courier_id: courier_id.to_string(),
            pending_total: to_f64(pending),
            settled_total: to_f64(settled),
            entries,
        })
    }

    /// Settle all pending earnings for a courier. Idempotent: a retry
    /// settles nothing further. Returns the number of rows settled.
    pub fn settle_earnings(&self, courier_id: &str) -> Result<usize, OrderError> {
        self.storage
            .get_courier(courier_id)?
            .ok_or_else(|| OrderError::CourierNotFound(courier_id.to_string()))?;

        let settled = self.storage.settle_earnings_for_courier(courier_id)?;
        if settled > 0 {
            tracing::info!(courier_id, settled, "Courier earnings settled");
        }
        Ok(settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::EarningEntry;
    use shared::order::{OrderRecord, OrderStatus};

    fn service() -> DispatchService {
        DispatchService::new(OrderStorage::open_in_memory().unwrap())
    }

    fn delivery_record(order_id: &str, status: OrderStatus, courier: Option<&str>) -> OrderRecord {
        let mut record = OrderRecord::new(order_id.to_string());
        record.destination = Destination::Delivery {
            address: DeliveryAddress {
                street: "Rua A".to_string(),
                number: "10".to_string(),
                complement: None,
                neighborhood: "Centro".to_string(),
                reference: None,
            },
        };
        record.status = status;
        record.courier_id = courier.map(str::to_string);
        record.total = 40.0;
        record.delivery_code = "4821".to_string();
        record
    }

    fn insert_active(service: &DispatchService, record: &OrderRecord) {
        let txn = service.storage.begin_write().unwrap();
        service.storage.store_record(&txn, record).unwrap();
        service
            .storage
            .mark_order_active(&txn, &record.order_id)
            .unwrap();
        txn.commit().unwrap();
    }

    #[test]
    fn test_registry_lifecycle() {
        let service = service();
        let courier = service
            .register_courier("Rider One", VehicleType::Bicycle)
            .unwrap();
        assert!(courier.active);

        let deactivated = service.deactivate_courier(&courier.courier_id).unwrap();
        assert!(!deactivated.active);

        // Row survives deactivation
        let loaded = service.get_courier(&courier.courier_id).unwrap().unwrap();
        assert!(!loaded.active);

        assert!(matches!(
            service.deactivate_courier("missing"),
            Err(OrderError::CourierNotFound(_))
        ));
    }

    #[test]
    fn test_claimable_view_strips_delivery_code() {
        let service = service();
        insert_active(
            &service,
            &delivery_record("order-1", OrderStatus::Ready, None),
        );
        insert_active(
            &service,
            &delivery_record("order-2", OrderStatus::Ready, Some("courier-9")),
        );
        insert_active(
            &service,
            &delivery_record("order-3", OrderStatus::Preparing, None),
        );

        let claimable = service.list_claimable().unwrap();
        assert_eq!(claimable.len(), 1);
        assert_eq!(claimable[0].order_id, "order-1");

        // The serialized view must not leak the proof-of-delivery code
        let json = serde_json::to_string(&claimable[0]).unwrap();
        assert!(!json.contains("4821"));
        assert!(!json.contains("delivery_code"));
    }

    #[test]
    fn test_position_requires_active_courier() {
        let service = service();
        let courier = service
            .register_courier("Rider One", VehicleType::Motorcycle)
            .unwrap();

        let fix = PositionFix {
            lat: -23.55,
            lng: -46.63,
            recorded_at: 100,
        };
        service.record_position(&courier.courier_id, fix);
        assert!(service.position(&courier.courier_id).is_some());

        // Unknown couriers never enter the tracker
        service.record_position("ghost", fix);
        assert!(service.position("ghost").is_none());

        // Deactivation clears the live position
        service.deactivate_courier(&courier.courier_id).unwrap();
        assert!(service.position(&courier.courier_id).is_none());
    }

    #[test]
    fn test_earnings_totals_and_settlement() {
        let service = service();
        let courier = service
            .register_courier("Rider One", VehicleType::Motorcycle)
            .unwrap();

        let txn = service.storage.begin_write().unwrap();
        for (order_id, amount, settled) in
            [("order-1", 40.0, false), ("order-2", 25.5, false), ("order-3", 10.0, true)]
        {
            service
                .storage
                .store_earning(
                    &txn,
                    &EarningEntry {
                        order_id: order_id.to_string(),
                        courier_id: courier.courier_id.clone(),
                        amount,
                        delivered_at: 1000,
                        settled,
                    },
                )
                .unwrap();
        }
        txn.commit().unwrap();

        let report = service.earnings(&courier.courier_id).unwrap();
        assert_eq!(report.pending_total, 65.5);
        assert_eq!(report.settled_total, 10.0);
        assert_eq!(report.entries.len(), 3);

        assert_eq!(service.settle_earnings(&courier.courier_id).unwrap(), 2);
        // Settlement is idempotent
        assert_eq!(service.settle_earnings(&courier.courier_id).unwrap(), 0);

        let report = service.earnings(&courier.courier_id).unwrap();
        assert_eq!(report.pending_total, 0.0);
        assert_eq!(report.settled_total, 75.5);
    }
}
