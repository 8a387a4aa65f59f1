//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [sale] machine=001 qty=2 stock=5->3
//! [refill] machine=001 qty=3 stock=3->6
//! [stock-low] machine=001
//! [stock-ok] machine=001
//! [created] machine=004 stock=10
//! [deleted] machine=004
//! [status] machine=001 status=idle
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventBus, Payload};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Subscribe it for every kind (see [`EventKind::ALL`](crate::EventKind::ALL))
/// to trace the full event stream. Intended for development and demos —
/// implement a custom [`Subscribe`] for structured logging.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, event: &Event, _bus: &EventBus) {
        let machine = &event.machine;
        match &event.payload {
            Payload::Sale {
                quantity,
                stock_before,
                stock_after,
            } => {
                println!("[sale] machine={machine} qty={quantity} stock={stock_before}->{stock_after}");
            }
            Payload::Refill {
                quantity,
                stock_before,
                stock_after,
            } => {
                println!("[refill] machine={machine} qty={quantity} stock={stock_before}->{stock_after}");
            }
            Payload::LowStock => println!("[stock-low] machine={machine}"),
            Payload::StockOk => println!("[stock-ok] machine={machine}"),
            Payload::Created { stock_level } => {
                println!("[created] machine={machine} stock={stock_level}");
            }
            Payload::Deleted => println!("[deleted] machine={machine}"),
            Payload::StatusChanged { status } => {
                println!("[status] machine={machine} status={}", status.as_label());
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
