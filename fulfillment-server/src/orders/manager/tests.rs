use super::*;
use shared::models::{CashierShift, Courier, ShiftStatus, VehicleType};
use shared::order::{
    CustomerInfo, DeliveryAddress, Destination, OrderCommandPayload, OrderEventType,
    OrderItemInput, OrderStatus, PaymentInput, PaymentMethod, PaymentStatus,
};
use shared::{CommandErrorCode, Role};

fn create_test_manager() -> FulfillmentManager {
    let storage = OrderStorage::open_in_memory().unwrap();
    FulfillmentManager::with_storage(storage, "venue-1")
}

fn simple_item(name: &str, price: f64, quantity: i32) -> OrderItemInput {
    OrderItemInput {
        name: name.to_string(),
        unit_price: price,
        quantity,
        note: None,
    }
}

fn dine_in(table_id: &str) -> Destination {
    Destination::DineIn {
        table_id: table_id.to_string(),
        table_label: format!("Table {table_id}"),
    }
}

fn delivery() -> Destination {
    Destination::Delivery {
        address: DeliveryAddress {
            street: "Rua das Flores".to_string(),
            number: "123".to_string(),
            complement: None,
            neighborhood: "Centro".to_string(),
            reference: None,
        },
    }
}

fn create_order(
    manager: &FulfillmentManager,
    destination: Destination,
    items: Vec<OrderItemInput>,
) -> String {
    let cmd = OrderCommand::new(
        "counter-1",
        "Counter",
        Role::Counter,
        OrderCommandPayload::CreateOrder {
            destination,
            customer: CustomerInfo {
                name: "Maria".to_string(),
                phone: None,
            },
            items,
        },
    );
    let resp = manager.execute_command(cmd);
    assert!(resp.success, "create failed: {:?}", resp.error);
    resp.order_id.unwrap()
}

/// Drive an order to Ready through the kitchen.
fn make_ready(manager: &FulfillmentManager, order_id: &str) {
    let accept = OrderCommand::new(
        "kitchen-1",
        "Kitchen",
        Role::Kitchen,
        OrderCommandPayload::AcceptOrder {
            order_id: order_id.to_string(),
        },
    );
    assert!(manager.execute_command(accept).success);

    let ready = OrderCommand::new(
        "kitchen-1",
        "Kitchen",
        Role::Kitchen,
        OrderCommandPayload::MarkReady {
            order_id: order_id.to_string(),
        },
    );
    assert!(manager.execute_command(ready).success);
}

fn insert_shift(manager: &FulfillmentManager, shift_id: &str, status: ShiftStatus) {
    let shift = CashierShift {
        shift_id: shift_id.to_string(),
        operator_id: "cashier-1".to_string(),
        operator_name: "Ana".to_string(),
        status,
        opening_float: 100.0,
        opened_at: 0,
        closed_at: match status {
            ShiftStatus::Open => None,
            ShiftStatus::Closed => Some(1),
        },
    };
    let txn = manager.storage().begin_write().unwrap();
    manager.storage().store_shift(&txn, &shift).unwrap();
    txn.commit().unwrap();
}

fn insert_courier(manager: &FulfillmentManager, courier_id: &str) {
    manager
        .storage()
        .store_courier(&Courier {
            courier_id: courier_id.to_string(),
            name: format!("Rider {courier_id}"),
            vehicle: VehicleType::Motorcycle,
            active: true,
            created_at: 0,
        })
        .unwrap();
}

fn pay(
    manager: &FulfillmentManager,
    order_id: &str,
    shift_id: &str,
    method: PaymentMethod,
    amount: f64,
) -> CommandResponse {
    manager.execute_command(OrderCommand::new(
        "cashier-1",
        "Ana",
        Role::Cashier,
        OrderCommandPayload::RecordPayment {
            order_id: order_id.to_string(),
            shift_id: shift_id.to_string(),
            payment: PaymentInput { method, amount },
        },
    ))
}

// ========================================================================
// Full flows
// ========================================================================

#[test]
fn test_dine_in_cash_flow() {
    let manager = create_test_manager();
    insert_shift(&manager, "shift-1", ShiftStatus::Open);

    let order_id = create_order(
        &manager,
        dine_in("T5"),
        vec![simple_item("X-Burger", 20.0, 1), simple_item("Guarana", 5.0, 1)],
    );

    let record = manager.get_record(&order_id).unwrap().unwrap();
    assert_eq!(record.status, OrderStatus::Pending);
    assert_eq!(record.total, 25.0);
    assert_eq!(record.number, 1);

    make_ready(&manager, &order_id);

    // Tender R$50 cash against a R$25 total
    let resp = pay(&manager, &order_id, "shift-1", PaymentMethod::Cash, 50.0);
    assert!(resp.success, "payment failed: {:?}", resp.error);

    let record = manager.get_record(&order_id).unwrap().unwrap();
    assert_eq!(record.status, OrderStatus::Delivered);
    assert_eq!(record.payment_status, PaymentStatus::Paid);
    assert_eq!(record.payment_method, Some(PaymentMethod::Cash));

    // Ledger row carries the settled total and the change separately
    let payments = manager.storage().get_payments_for_shift("shift-1").unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount, 25.0);
    assert_eq!(payments[0].change, 25.0);

    // Terminal order leaves the active index; the table frees
    assert!(!manager.storage().is_order_active(&order_id).unwrap());
    assert!(manager.storage().active_order_for_table("T5").unwrap().is_none());
}

#[test]
fn test_delivery_flow_with_code_verification() {
    let manager = create_test_manager();
    insert_shift(&manager, "shift-1", ShiftStatus::Open);
    insert_courier(&manager, "courier-1");

    let order_id = create_order(&manager, delivery(), vec![simple_item("Pizza", 40.0, 1)]);
    let code = manager
        .get_record(&order_id)
        .unwrap()
        .unwrap()
        .delivery_code
        .clone();
    assert_eq!(code.len(), 4);

    make_ready(&manager, &order_id);

    let claim = manager.execute_command(OrderCommand::new(
        "courier-1",
        "Rider",
        Role::Courier,
        OrderCommandPayload::ClaimOrder {
            order_id: order_id.clone(),
            courier_id: "courier-1".to_string(),
        },
    ));
    assert!(claim.success);

    // Wrong code rejected, order untouched
    let bad = manager.execute_command(OrderCommand::new(
        "courier-1",
        "Rider",
        Role::Courier,
        OrderCommandPayload::VerifyDelivery {
            order_id: order_id.clone(),
            code: "XXXX".to_string(),
            shift_id: Some("shift-1".to_string()),
        },
    ));
    assert_eq!(
        bad.error.unwrap().code,
        CommandErrorCode::InvalidDeliveryCode
    );
    assert_eq!(
        manager.get_record(&order_id).unwrap().unwrap().status,
        OrderStatus::Ready
    );

    // Correct code settles cash-on-delivery and completes the order
    let ok = manager.execute_command(OrderCommand::new(
        "courier-1",
        "Rider",
        Role::Courier,
        OrderCommandPayload::VerifyDelivery {
            order_id: order_id.clone(),
            code,
            shift_id: Some("shift-1".to_string()),
        },
    ));
    assert!(ok.success, "verify failed: {:?}", ok.error);

    let record = manager.get_record(&order_id).unwrap().unwrap();
    assert_eq!(record.status, OrderStatus::Delivered);
    assert_eq!(record.payment_status, PaymentStatus::Paid);

    // One payment row and one earning row, both written in the same commit
    let payments = manager.storage().get_payments_for_order(&order_id).unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount, 40.0);

    let earning = manager.storage().get_earning(&order_id).unwrap().unwrap();
    assert_eq!(earning.courier_id, "courier-1");
    assert_eq!(earning.amount, 40.0);
    assert!(!earning.settled);
}

// ========================================================================
// Idempotency
// ========================================================================

#[test]
fn test_duplicate_command_not_reexecuted() {
    let manager = create_test_manager();

    let cmd = OrderCommand::new(
        "counter-1",
        "Counter",
        Role::Counter,
        OrderCommandPayload::CreateOrder {
            destination: dine_in("T1"),
            customer: CustomerInfo::default(),
            items: vec![simple_item("Coffee", 6.0, 1)],
        },
    );

    let first = manager.execute_command(cmd.clone());
    assert!(first.success);
    let seq_after_first = manager.get_current_sequence().unwrap();

    let second = manager.execute_command(cmd);
    assert!(second.success);
    assert!(second.order_id.is_none());
    assert_eq!(manager.get_current_sequence().unwrap(), seq_after_first);
    assert_eq!(manager.get_active_orders().unwrap().len(), 1);
}

#[test]
fn test_payment_settles_exactly_once() {
    let manager = create_test_manager();
    insert_shift(&manager, "shift-1", ShiftStatus::Open);

    let order_id = create_order(&manager, dine_in("T2"), vec![simple_item("Burger", 30.0, 1)]);
    make_ready(&manager, &order_id);

    assert!(pay(&manager, &order_id, "shift-1", PaymentMethod::Pix, 30.0).success);

    // A retry with a fresh command id must fail, not double-charge
    let again = pay(&manager, &order_id, "shift-1", PaymentMethod::Pix, 30.0);
    assert!(!again.success);
    assert_eq!(again.error.unwrap().code, CommandErrorCode::PaymentSettled);
    assert_eq!(
        manager.storage().get_payments_for_order(&order_id).unwrap().len(),
        1
    );
}

// ========================================================================
// Claim arbitration
// ========================================================================

#[test]
fn test_claim_single_winner() {
    let manager = create_test_manager();
    insert_courier(&manager, "courier-1");
    insert_courier(&manager, "courier-2");

    let order_id = create_order(&manager, delivery(), vec![simple_item("Pizza", 40.0, 1)]);
    make_ready(&manager, &order_id);

    let claim = |courier: &str| {
        manager.execute_command(OrderCommand::new(
            courier,
            "Rider",
            Role::Courier,
            OrderCommandPayload::ClaimOrder {
                order_id: order_id.clone(),
                courier_id: courier.to_string(),
            },
        ))
    };

    assert!(claim("courier-1").success);

    let lost = claim("courier-2");
    assert!(!lost.success);
    assert_eq!(lost.error.unwrap().code, CommandErrorCode::AlreadyClaimed);

    let record = manager.get_record(&order_id).unwrap().unwrap();
    assert_eq!(record.courier_id.as_deref(), Some("courier-1"));
    assert_eq!(record.status, OrderStatus::Ready);
}

// ========================================================================
// Failure surfaces
// ========================================================================

#[test]
fn test_payment_against_closed_shift() {
    let manager = create_test_manager();
    insert_shift(&manager, "shift-1", ShiftStatus::Closed);

    let order_id = create_order(&manager, dine_in("T3"), vec![simple_item("Burger", 30.0, 1)]);
    make_ready(&manager, &order_id);

    let resp = pay(&manager, &order_id, "shift-1", PaymentMethod::Cash, 30.0);
    assert!(!resp.success);
    assert_eq!(resp.error.unwrap().code, CommandErrorCode::ShiftClosed);

    // Nothing committed: order unpaid, no ledger row
    let record = manager.get_record(&order_id).unwrap().unwrap();
    assert_eq!(record.payment_status, PaymentStatus::Pending);
    assert!(manager.storage().get_payments_for_order(&order_id).unwrap().is_empty());
}

#[test]
fn test_stale_transition_reported_distinctly() {
    let manager = create_test_manager();
    let order_id = create_order(&manager, dine_in("T4"), vec![simple_item("Coffee", 6.0, 1)]);
    make_ready(&manager, &order_id);

    // Accepting a Ready order is a concurrency artifact, not a hard error
    let resp = manager.execute_command(OrderCommand::new(
        "kitchen-1",
        "Kitchen",
        Role::Kitchen,
        OrderCommandPayload::AcceptOrder {
            order_id: order_id.clone(),
        },
    ));
    assert_eq!(resp.error.unwrap().code, CommandErrorCode::StaleTransition);
}

#[test]
fn test_unknown_order() {
    let manager = create_test_manager();
    let resp = manager.execute_command(OrderCommand::new(
        "kitchen-1",
        "Kitchen",
        Role::Kitchen,
        OrderCommandPayload::AcceptOrder {
            order_id: "no-such-order".to_string(),
        },
    ));
    assert_eq!(resp.error.unwrap().code, CommandErrorCode::OrderNotFound);
}

// ========================================================================
// Fan-out and replay
// ========================================================================

#[test]
fn test_change_notices_broadcast_after_commit() {
    let manager = create_test_manager();
    let mut rx = manager.subscribe();

    let order_id = create_order(&manager, dine_in("T6"), vec![simple_item("Coffee", 6.0, 1)]);

    let notice = rx.try_recv().unwrap();
    assert_eq!(notice.venue_id, "venue-1");
    assert_eq!(notice.order_id, order_id);
    assert_eq!(notice.number, 1);
    assert_eq!(notice.kind, OrderEventType::OrderCreated);
    assert_eq!(notice.sequence, 1);
}

#[test]
fn test_failed_command_broadcasts_nothing() {
    let manager = create_test_manager();
    let mut rx = manager.subscribe();

    let resp = manager.execute_command(OrderCommand::new(
        "kitchen-1",
        "Kitchen",
        Role::Kitchen,
        OrderCommandPayload::MarkReady {
            order_id: "missing".to_string(),
        },
    ));
    assert!(!resp.success);
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_rebuild_matches_stored_record() {
    let manager = create_test_manager();
    insert_shift(&manager, "shift-1", ShiftStatus::Open);

    let order_id = create_order(
        &manager,
        dine_in("T7"),
        vec![simple_item("X-Burger", 20.0, 1)],
    );

    let append = manager.execute_command(OrderCommand::new(
        "counter-1",
        "Counter",
        Role::Counter,
        OrderCommandPayload::AppendItems {
            order_id: order_id.clone(),
            items: vec![simple_item("Guarana", 5.0, 1)],
        },
    ));
    assert!(append.success);

    make_ready(&manager, &order_id);
    assert!(pay(&manager, &order_id, "shift-1", PaymentMethod::Debit, 25.0).success);

    let stored = manager.get_record(&order_id).unwrap().unwrap();
    let rebuilt = manager.rebuild_record(&order_id).unwrap();
    assert_eq!(stored, rebuilt);
    assert_eq!(rebuilt.items.len(), 2);
    assert_eq!(rebuilt.total, 25.0);
    assert_eq!(rebuilt.status, OrderStatus::Delivered);
}

#[test]
fn test_events_since_high_water_mark() {
    let manager = create_test_manager();

    let order_id = create_order(&manager, dine_in("T8"), vec![simple_item("Coffee", 6.0, 1)]);
    make_ready(&manager, &order_id);

    let all = manager.get_events_since(0).unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.windows(2).all(|w| w[0].sequence < w[1].sequence));

    let tail = manager.get_events_since(all[1].sequence).unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].event_type, OrderEventType::OrderReady);
}
