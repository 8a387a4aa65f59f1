//! # Edge-triggered stock threshold monitor.
//!
//! [`ThresholdMonitor`] observes sale/refill events and publishes derived
//! [`LowStock`](crate::EventKind::LowStock) / [`StockOk`](crate::EventKind::StockOk)
//! events exactly once per threshold crossing.
//!
//! ## Rules
//! - Crossings are **edge-triggered** on the `(stock_before, stock_after)`
//!   snapshot carried by the event, not level-triggered on the live value:
//!   repeated sales or refills that stay on the same side of the threshold
//!   emit nothing.
//! - The monitor is stateless — no per-machine "already warned" flag, and it
//!   never reads the store. A shared mutable flag observed by both a mutator
//!   and a monitor is the race this design removes: one handler's write
//!   beats the other's read. The snapshot on the event is the single source
//!   of truth for which side of the threshold the transition happened on.
//! - Derived events go through the bus handle passed into `on_event`, so
//!   they are delivered after the current queue drains (breadth-first).

use async_trait::async_trait;

use crate::events::{Event, EventBus};
use crate::subscribers::Subscribe;

/// Stock level below which a machine is considered low on stock.
pub const LOW_STOCK_THRESHOLD: u32 = 3;

/// Stateless monitor emitting low-stock / stock-ok events on crossings.
///
/// Subscribe it for both [`EventKind::Sale`](crate::EventKind::Sale) and
/// [`EventKind::Refill`](crate::EventKind::Refill).
pub struct ThresholdMonitor {
    threshold: u32,
}

impl ThresholdMonitor {
    /// Monitor with the default [`LOW_STOCK_THRESHOLD`].
    pub fn new() -> Self {
        Self::with_threshold(LOW_STOCK_THRESHOLD)
    }

    /// Monitor with a custom threshold.
    pub fn with_threshold(threshold: u32) -> Self {
        Self { threshold }
    }
}

impl Default for ThresholdMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Subscribe for ThresholdMonitor {
    async fn on_event(&self, event: &Event, bus: &EventBus) {
        let Some((before, after)) = event.stock_transition() else {
            return;
        };

        if before >= self.threshold && after < self.threshold {
            bus.publish(Event::low_stock(event.machine.clone())).await;
        } else if before < self.threshold && after >= self.threshold {
            bus.publish(Event::stock_ok(event.machine.clone())).await;
        }
    }

    fn name(&self) -> &'static str {
        "threshold-monitor"
    }
}
