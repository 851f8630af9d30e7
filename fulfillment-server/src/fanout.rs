//! Change fan-out: role-filtered notice feeds and list views.
//!
//! Notices are broadcast by the manager after every committed command;
//! this module decides which roles observe which notice kinds, and serves
//! the role-scoped active-order lists clients re-fetch on a notice (or on
//! reconnect, which converges even when notices were missed).

use crate::orders::manager::{FulfillmentManager, ManagerResult};
use shared::actor::Role;
use shared::order::{OrderEventType, OrderRecord, OrderStatus};
use shared::ChangeNotice;
use tokio::sync::broadcast;

/// Which notice kinds a role-view observes.
///
/// The counter sees everything; the other roles only what moves their
/// queue. Filtering kinds (not orders) keeps the bus payload-free.
pub fn role_observes(role: Role, kind: OrderEventType) -> bool {
    use OrderEventType::*;
    match role {
        Role::Counter => true,
        Role::Kitchen => matches!(
            kind,
            OrderCreated | ItemsAppended | OrderAccepted | OrderReady | OrderRejected
                | OrderCanceled
        ),
        Role::Courier => matches!(kind, OrderReady | CourierAssigned | OrderCanceled | OrderDelivered),
        Role::Cashier => matches!(kind, OrderReady | PaymentRecorded | OrderCanceled | OrderDelivered),
    }
}

/// A role-filtered subscription to the change bus.
pub struct RoleFeed {
    role: Role,
    rx: broadcast::Receiver<ChangeNotice>,
}

impl RoleFeed {
    /// Receive the next notice this role observes.
    ///
    /// A `Lagged` error means notices were dropped; the client should
    /// re-fetch its list instead of resuming from the feed.
    pub async fn recv(&mut self) -> Result<ChangeNotice, broadcast::error::RecvError> {
        loop {
            let notice = self.rx.recv().await?;
            if role_observes(self.role, notice.kind) {
                return Ok(notice);
            }
        }
    }
}

/// Role-scoped access to the manager's change bus and active orders.
#[derive(Clone)]
pub struct ChangeBus {
    manager: FulfillmentManager,
}

impl ChangeBus {
    pub fn new(manager: FulfillmentManager) -> Self {
        Self { manager }
    }

    /// Subscribe a role-view to the change bus
    pub fn subscribe(&self, role: Role) -> RoleFeed {
        RoleFeed {
            role,
            rx: self.manager.subscribe(),
        }
    }

    /// Active orders as seen by a role.
    ///
    /// - Counter: every non-terminal order.
    /// - Kitchen: the preparation queue (`Pending`, `Preparing`).
    /// - Courier: claimable delivery orders, with the delivery code blanked.
    /// - Cashier: `Ready` unpaid orders with something to settle.
    pub fn list_active_orders(&self, role: Role) -> ManagerResult<Vec<OrderRecord>> {
        let mut records = self.manager.get_active_orders()?;
        records.retain(|record| match role {
            Role::Counter => true,
            Role::Kitchen => matches!(
                record.status,
                OrderStatus::Pending | OrderStatus::Preparing
            ),
            Role::Courier => record.is_claimable(),
            Role::Cashier => {
                record.status == OrderStatus::Ready && !record.is_paid() && record.total > 0.0
            }
        });

        // Couriers learn the code from the customer, never from the server
        if role == Role::Courier {
            for record in &mut records {
                record.delivery_code = String::new();
            }
        }

        records.sort_by_key(|r| r.number);
        Ok(records)
    }
}
