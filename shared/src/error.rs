//! Wire-level command results and error codes.
//!
//! Layered errors inside the server (`OrderError`, `ManagerError`) all
//! collapse into a `CommandError` before reaching a client, so role-views
//! only ever match on `CommandErrorCode`.

use serde::{Deserialize, Serialize};

/// Command response returned to the submitting client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The command ID this responds to
    pub command_id: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Order ID affected (set on success; for CreateOrder this is the new id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Error details if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(command_id: String, order_id: Option<String>) -> Self {
        Self {
            command_id,
            success: true,
            order_id,
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            order_id: None,
            error: Some(error),
        }
    }

    /// Acknowledge a command that was already processed (idempotent retry).
    pub fn duplicate(command_id: String) -> Self {
        Self {
            command_id,
            success: true,
            order_id: None,
            error: None,
        }
    }
}

/// Command error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Command error codes (clients localize the message themselves).
///
/// `StaleTransition` and `AlreadyClaimed` deserve a distinct surface: the
/// operator should see "someone already handled this" and re-sync, not a
/// generic failure inviting a blind retry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    OrderNotFound,
    /// Operation is never legal from the order's current status
    InvalidState,
    /// Precondition status mismatch caused by a concurrent actor; safe to
    /// retry after re-reading the order
    StaleTransition,
    /// Claim race lost: another courier is already assigned
    AlreadyClaimed,
    /// The order's payment is already settled
    PaymentSettled,
    /// Payment amount does not reconcile with the order total
    PaymentMismatch,
    InvalidDeliveryCode,
    ShiftAlreadyOpen,
    ShiftNotFound,
    ShiftClosed,
    CourierNotFound,
    CourierInactive,
    InvalidAmount,
    ReasonRequired,
    Unauthorized,
    DuplicateCommand,
    InternalError,
    // Storage classifications
    StorageFull,
    StorageCorrupted,
    SystemBusy,
}
