//! Refill handler: adds refilled units to the machine's stock.

use std::sync::Arc;

use async_trait::async_trait;

use crate::events::{Event, EventBus, Payload};
use crate::store::MachineStore;
use crate::subscribers::Subscribe;

/// Applies [`Payload::Refill`] deltas to the [`MachineStore`].
///
/// A refill against a machine that no longer exists is a no-op.
pub struct RefillSubscriber {
    store: Arc<MachineStore>,
}

impl RefillSubscriber {
    pub fn new(store: Arc<MachineStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Subscribe for RefillSubscriber {
    async fn on_event(&self, event: &Event, _bus: &EventBus) {
        let Payload::Refill { quantity, .. } = &event.payload else {
            return;
        };
        let Some(mut machine) = self.store.get(&event.machine).await else {
            return;
        };

        machine.apply_refill(*quantity);
        self.store.upsert(machine).await;
    }

    fn name(&self) -> &'static str {
        "refill"
    }
}
