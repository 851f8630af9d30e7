//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles
//! one specific command type.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{OrderCommand, OrderCommandPayload, OrderEvent};

mod accept_order;
mod append_items;
mod cancel_order;
mod claim_order;
mod create_order;
mod mark_ready;
mod record_payment;
mod reject_order;
mod verify_delivery;

pub use accept_order::AcceptOrderAction;
pub use append_items::AppendItemsAction;
pub use cancel_order::CancelOrderAction;
pub use claim_order::ClaimOrderAction;
pub use create_order::CreateOrderAction;
pub use mark_ready::MarkReadyAction;
pub use record_payment::RecordPaymentAction;
pub use reject_order::RejectOrderAction;
pub use verify_delivery::VerifyDeliveryAction;

/// CommandAction enum - dispatches to concrete action implementations
pub enum CommandAction {
    CreateOrder(CreateOrderAction),
    AppendItems(AppendItemsAction),
    AcceptOrder(AcceptOrderAction),
    MarkReady(MarkReadyAction),
    RejectOrder(RejectOrderAction),
    CancelOrder(CancelOrderAction),
    ClaimOrder(ClaimOrderAction),
    RecordPayment(RecordPaymentAction),
    VerifyDelivery(VerifyDeliveryAction),
}

/// Manual implementation of CommandHandler for CommandAction
#[async_trait]
impl CommandHandler for CommandAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        match self {
            CommandAction::CreateOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::AppendItems(action) => action.execute(ctx, metadata).await,
            CommandAction::AcceptOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::MarkReady(action) => action.execute(ctx, metadata).await,
            CommandAction::RejectOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::CancelOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::ClaimOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::RecordPayment(action) => action.execute(ctx, metadata).await,
            CommandAction::VerifyDelivery(action) => action.execute(ctx, metadata).await,
        }
    }
}

/// Convert OrderCommand to CommandAction
///
/// This is the ONLY place with a match on OrderCommandPayload.
impl From<&OrderCommand> for CommandAction {
    fn from(cmd: &OrderCommand) -> Self {
        match &cmd.payload {
            OrderCommandPayload::CreateOrder {
                destination,
                customer,
                items,
            } => CommandAction::CreateOrder(CreateOrderAction {
                destination: destination.clone(),
                customer: customer.clone(),
                items: items.clone(),
            }),
            OrderCommandPayload::AppendItems { order_id, items } => {
                CommandAction::AppendItems(AppendItemsAction {
                    order_id: order_id.clone(),
                    items: items.clone(),
                })
            }
            OrderCommandPayload::AcceptOrder { order_id } => {
                CommandAction::AcceptOrder(AcceptOrderAction {
                    order_id: order_id.clone(),
                })
            }
            OrderCommandPayload::MarkReady { order_id } => {
                CommandAction::MarkReady(MarkReadyAction {
                    order_id: order_id.clone(),
                })
            }
            OrderCommandPayload::RejectOrder { order_id, reason } => {
                CommandAction::RejectOrder(RejectOrderAction {
                    order_id: order_id.clone(),
                    reason: reason.clone(),
                })
            }
            OrderCommandPayload::CancelOrder { order_id, reason } => {
                CommandAction::CancelOrder(CancelOrderAction {
                    order_id: order_id.clone(),
                    reason: reason.clone(),
                })
            }
            OrderCommandPayload::ClaimOrder {
                order_id,
                courier_id,
            } => CommandAction::ClaimOrder(ClaimOrderAction {
                order_id: order_id.clone(),
                courier_id: courier_id.clone(),
            }),
            OrderCommandPayload::RecordPayment {
                order_id,
                shift_id,
                payment,
            } => CommandAction::RecordPayment(RecordPaymentAction {
                order_id: order_id.clone(),
                shift_id: shift_id.clone(),
                payment: payment.clone(),
            }),
            OrderCommandPayload::VerifyDelivery {
                order_id,
                code,
                shift_id,
            } => CommandAction::VerifyDelivery(VerifyDeliveryAction {
                order_id: order_id.clone(),
                code: code.clone(),
                shift_id: shift_id.clone(),
            }),
        }
    }
}
