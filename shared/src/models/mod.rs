//! Persisted side models: cashier shifts, payments, couriers, tables.

pub mod courier;
pub mod shift;
pub mod table;

pub use courier::{Courier, CourierEarnings, EarningEntry, PositionFix, VehicleType};
pub use shift::{CashierShift, MethodTotal, Payment, ShiftStatus, ShiftSummary};
pub use table::{Table, TableView};
