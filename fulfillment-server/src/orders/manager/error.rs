use super::super::storage::StorageError;
use super::super::traits::OrderError;
use shared::{CommandError, CommandErrorCode};
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Order(OrderError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<OrderError> for ManagerError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Storage(e) => ManagerError::Storage(e),
            other => ManagerError::Order(other),
        }
    }
}

/// Classify a storage failure into a wire error code (clients localize).
fn classify_storage_error(e: &StorageError) -> CommandErrorCode {
    if let StorageError::Serialization(_) = e {
        return CommandErrorCode::InternalError;
    }

    // redb errors are classified by message
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return CommandErrorCode::StorageFull;
    }

    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return CommandErrorCode::StorageCorrupted;
    }

    // Default for Database/Transaction/Table/Storage/Commit errors
    CommandErrorCode::SystemBusy
}

fn order_error_code(err: &OrderError) -> CommandErrorCode {
    match err {
        OrderError::OrderNotFound(_) => CommandErrorCode::OrderNotFound,
        OrderError::InvalidState { .. } => CommandErrorCode::InvalidState,
        OrderError::StaleTransition { .. } => CommandErrorCode::StaleTransition,
        OrderError::AlreadyClaimed { .. } => CommandErrorCode::AlreadyClaimed,
        OrderError::PaymentSettled(_) => CommandErrorCode::PaymentSettled,
        OrderError::PaymentMismatch(_) => CommandErrorCode::PaymentMismatch,
        OrderError::InvalidDeliveryCode => CommandErrorCode::InvalidDeliveryCode,
        OrderError::ShiftAlreadyOpen(_) => CommandErrorCode::ShiftAlreadyOpen,
        OrderError::ShiftNotFound(_) => CommandErrorCode::ShiftNotFound,
        OrderError::ShiftClosed(_) => CommandErrorCode::ShiftClosed,
        OrderError::CourierNotFound(_) => CommandErrorCode::CourierNotFound,
        OrderError::CourierInactive(_) => CommandErrorCode::CourierInactive,
        OrderError::InvalidAmount(_) => CommandErrorCode::InvalidAmount,
        OrderError::ReasonRequired(_) => CommandErrorCode::ReasonRequired,
        // Claiming or code-verifying a non-delivery order is a state error
        OrderError::NotDelivery(_) => CommandErrorCode::InvalidState,
        OrderError::Unauthorized { .. } => CommandErrorCode::Unauthorized,
        OrderError::Storage(e) => classify_storage_error(e),
    }
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        let (code, message) = match err {
            ManagerError::Storage(e) => {
                let code = classify_storage_error(&e);
                tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
                (code, e.to_string())
            }
            ManagerError::Order(e) => (order_error_code(&e), e.to_string()),
            ManagerError::Internal(msg) => (CommandErrorCode::InternalError, msg),
        };
        CommandError::new(code, message)
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
