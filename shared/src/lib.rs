//! Shared domain types for the order fulfillment core.
//!
//! Everything a connected role-view (counter, kitchen, courier, cashier)
//! needs to talk to the core lives here: commands, events, change notices,
//! the order record itself, and the wire-level error codes.

pub mod actor;
pub mod error;
pub mod message;
pub mod models;
pub mod order;
pub mod util;

pub use actor::Role;
pub use error::{CommandError, CommandErrorCode, CommandResponse};
pub use message::ChangeNotice;
