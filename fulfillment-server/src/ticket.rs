//! Ticket side-channel: kitchen tickets and customer stubs.
//!
//! A background worker listens to change notices and renders plain-text
//! tickets on order creation: one for the kitchen, one customer stub
//! carrying the proof-of-delivery code (the out-of-band channel the
//! courier never sees). Printing is best-effort; a failed print is logged
//! and never affects command processing.

use chrono::TimeZone;
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::orders::manager::FulfillmentManager;
use shared::order::{OrderEventType, OrderKind, OrderRecord};

const TICKET_WIDTH: usize = 32;

/// Output seam for rendered tickets.
///
/// Implementations hand the text to whatever prints it (thermal printer
/// driver, file, display).
pub trait TicketPrinter: Send + Sync {
    fn print(&self, ticket: &str) -> anyhow::Result<()>;
}

/// Printer that writes tickets to the log. The default until a real
/// printer backend is wired up.
#[derive(Debug, Default)]
pub struct LogPrinter;

impl TicketPrinter for LogPrinter {
    fn print(&self, ticket: &str) -> anyhow::Result<()> {
        tracing::info!(ticket = %ticket, "Ticket");
        Ok(())
    }
}

fn center(text: &str) -> String {
    if text.len() >= TICKET_WIDTH {
        return text.to_string();
    }
    let pad = (TICKET_WIDTH - text.len()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

fn rule() -> String {
    "-".repeat(TICKET_WIDTH)
}

fn format_time(millis: i64, tz: Tz) -> String {
    match tz.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%d/%m %H:%M").to_string(),
        None => String::new(),
    }
}

fn destination_line(record: &OrderRecord) -> String {
    match record.kind() {
        OrderKind::DineIn => {
            let label = record.destination.table_id().unwrap_or("?");
            format!("MESA {label}")
        }
        OrderKind::Delivery => "ENTREGA".to_string(),
        OrderKind::Pickup => "RETIRADA".to_string(),
    }
}

/// Render the kitchen ticket: destination, items and notes. No prices,
/// no delivery code.
pub fn render_kitchen_ticket(record: &OrderRecord, venue_name: &str, tz: Tz) -> String {
    let mut lines = Vec::new();
    lines.push(center(venue_name));
    lines.push(center(&format!("PEDIDO #{}", record.number)));
    lines.push(center(&destination_line(record)));
    lines.push(format_time(record.created_at, tz));
    lines.push(rule());
    for item in &record.items {
        lines.push(format!("{}x {}", item.quantity, item.name));
        if let Some(note) = &item.note {
            lines.push(format!("   * {note}"));
        }
    }
    lines.push(rule());
    lines.join("\n")
}

/// Render the customer stub: totals plus, for delivery orders, the
/// proof-of-delivery code the customer reads to the courier.
pub fn render_customer_stub(record: &OrderRecord, venue_name: &str, tz: Tz) -> String {
    let mut lines = Vec::new();
    lines.push(center(venue_name));
    lines.push(center(&format!("PEDIDO #{}", record.number)));
    lines.push(format_time(record.created_at, tz));
    lines.push(rule());
    for item in &record.items {
        lines.push(format!(
            "{}x {:<20} {:>7.2}",
            item.quantity, item.name, item.line_total
        ));
    }
    lines.push(rule());
    lines.push(format!("{:<23} {:>7.2}", "TOTAL", record.total));
    if record.kind() == OrderKind::Delivery {
        lines.push(rule());
        lines.push(center("CODIGO DE ENTREGA"));
        lines.push(center(&record.delivery_code));
        lines.push(center("informe ao entregador"));
    }
    lines.join("\n")
}

/// Background worker printing tickets for newly created orders.
pub struct TicketWorker {
    manager: FulfillmentManager,
    printer: Arc<dyn TicketPrinter>,
    venue_name: String,
    tz: Tz,
}

impl TicketWorker {
    pub fn new(
        manager: FulfillmentManager,
        printer: Arc<dyn TicketPrinter>,
        venue_name: impl Into<String>,
        tz: Tz,
    ) -> Self {
        Self {
            manager,
            printer,
            venue_name: venue_name.into(),
            tz,
        }
    }

    /// Run until the change bus closes or shutdown is signalled.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut rx = self.manager.subscribe();
        tracing::info!("Ticket worker started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Ticket worker received shutdown signal");
                    break;
                }
                notice = rx.recv() => {
                    match notice {
                        Ok(notice) if notice.kind == OrderEventType::OrderCreated => {
                            self.print_for_order(&notice.order_id);
                        }
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Ticket worker lagged, notices dropped");
                        }
                        Err(RecvError::Closed) => {
                            tracing::info!("Change bus closed, ticket worker stopping");
                            break;
                        }
                    }
                }
            }
        }
    }

    fn print_for_order(&self, order_id: &str) {
        let record = match self.manager.get_record(order_id) {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::warn!(order_id, "Order vanished before ticket print");
                return;
            }
            Err(e) => {
                tracing::error!(order_id, error = %e, "Failed to load order for ticket");
                return;
            }
        };

        let kitchen = render_kitchen_ticket(&record, &self.venue_name, self.tz);
        if let Err(e) = self.printer.print(&kitchen) {
            tracing::error!(order_id, error = %e, "Kitchen ticket print failed");
        }

        let stub = render_customer_stub(&record, &self.venue_name, self.tz);
        if let Err(e) = self.printer.print(&stub) {
            tracing::error!(order_id, error = %e, "Customer stub print failed");
        }
    }
}
