//! Actor roles supplied by the identity provider.

use serde::{Deserialize, Serialize};

/// Role claim attached to every command.
///
/// The core trusts this claim for transition authorization; authenticating
/// the actor is the identity provider's job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Counter,
    Kitchen,
    Courier,
    Cashier,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Counter => write!(f, "COUNTER"),
            Role::Kitchen => write!(f, "KITCHEN"),
            Role::Courier => write!(f, "COURIER"),
            Role::Cashier => write!(f, "CASHIER"),
        }
    }
}
