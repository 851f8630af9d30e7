//! Order fulfillment pipeline.
//!
//! Commands become actions, actions emit events, appliers fold events
//! into the order record, and everything persists in one transaction.

pub mod actions;
pub mod appliers;
pub mod manager;
pub mod money;
pub mod state;
pub mod storage;
pub mod traits;
