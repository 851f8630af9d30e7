//! Order fulfillment core for a single venue.
//!
//! Coordinates the journey of a physical order (creation, kitchen
//! preparation, dispatch, payment, delivery confirmation) across four
//! independently-connected actors (counter, kitchen, courier, cashier)
//! that observe and mutate shared order records concurrently.
//!
//! # Components
//!
//! - [`orders`]: order store, state machine, command actions, event appliers
//! - [`shifts`]: cashier shift ledger (open/close/summary)
//! - [`dispatch`]: courier registry, claim views, live positions, earnings
//! - [`fanout`]: venue-scoped change-notice broadcast and role filters
//! - [`ticket`]: kitchen ticket / customer stub side-channel
//!
//! Every state-mutating operation commits through a single `redb` write
//! transaction and then broadcasts a [`shared::ChangeNotice`]; clients
//! re-fetch their role's active-order subset instead of trusting payloads.

pub mod config;
pub mod dispatch;
pub mod fanout;
pub mod logging;
pub mod orders;
pub mod shifts;
pub mod ticket;

pub use config::ServerConfig;
pub use dispatch::DispatchService;
pub use fanout::ChangeBus;
pub use orders::manager::FulfillmentManager;
pub use orders::storage::OrderStorage;
pub use shifts::ShiftLedger;
