//! Sale handler: deducts sold units from the machine's stock.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::events::{Event, EventBus, Payload};
use crate::store::MachineStore;
use crate::subscribers::Subscribe;

/// Applies [`Payload::Sale`] deltas to the [`MachineStore`].
///
/// A sale against a machine that no longer exists is a no-op — a reference
/// to a deleted machine is a recoverable condition, not a fault. A sale that
/// would drive stock below zero is rejected and logged as a warning; the
/// stock level is left unchanged (see [`StockError`](crate::StockError)).
pub struct SaleSubscriber {
    store: Arc<MachineStore>,
}

impl SaleSubscriber {
    pub fn new(store: Arc<MachineStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Subscribe for SaleSubscriber {
    async fn on_event(&self, event: &Event, _bus: &EventBus) {
        let Payload::Sale { quantity, .. } = &event.payload else {
            return;
        };
        let Some(mut machine) = self.store.get(&event.machine).await else {
            return;
        };

        match machine.apply_sale(*quantity) {
            Ok(()) => self.store.upsert(machine).await,
            Err(err) => warn!(
                machine = %event.machine,
                error = err.as_label(),
                "sale rejected: {err}"
            ),
        }
    }

    fn name(&self) -> &'static str {
        "sale"
    }
}
