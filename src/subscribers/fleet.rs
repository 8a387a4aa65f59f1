//! Fleet lifecycle handler: machine creation, deletion, status changes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::events::{Event, EventBus, Payload};
use crate::store::{Machine, MachineStore};
use crate::subscribers::Subscribe;

/// Keeps the [`MachineStore`] in sync with fleet lifecycle events.
///
/// - [`Payload::Created`] inserts a machine with the event's stock level
///   (replacing any record under the same id).
/// - [`Payload::Deleted`] removes the record; unknown ids are a no-op.
/// - [`Payload::StatusChanged`] updates the status of an existing machine;
///   a missing machine is a no-op.
pub struct FleetSubscriber {
    store: Arc<MachineStore>,
}

impl FleetSubscriber {
    pub fn new(store: Arc<MachineStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Subscribe for FleetSubscriber {
    async fn on_event(&self, event: &Event, _bus: &EventBus) {
        match &event.payload {
            Payload::Created { stock_level } => {
                self.store
                    .upsert(Machine::with_stock(event.machine.clone(), *stock_level))
                    .await;
                info!(machine = %event.machine, stock = stock_level, "machine created");
            }
            Payload::Deleted => {
                if self.store.remove(&event.machine).await {
                    info!(machine = %event.machine, "machine deleted");
                }
            }
            Payload::StatusChanged { status } => {
                let Some(mut machine) = self.store.get(&event.machine).await else {
                    return;
                };
                machine.status = *status;
                self.store.upsert(machine).await;
                info!(
                    machine = %event.machine,
                    status = status.as_label(),
                    "machine status changed"
                );
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "fleet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BusConfig;
    use crate::events::EventKind;
    use crate::store::MachineStatus;

    async fn fixture() -> (EventBus, Arc<MachineStore>) {
        let store = Arc::new(MachineStore::new());
        let bus = EventBus::new(BusConfig::default());
        let sub = Arc::new(FleetSubscriber::new(store.clone()));
        bus.subscribe(EventKind::MachineCreated, sub.clone()).await;
        bus.subscribe(EventKind::MachineDeleted, sub.clone()).await;
        bus.subscribe(EventKind::StatusChanged, sub).await;
        (bus, store)
    }

    #[tokio::test]
    async fn test_created_inserts_machine() {
        let (bus, store) = fixture().await;
        bus.publish(Event::created("004", 10)).await;

        let machine = store.get("004").await.unwrap();
        assert_eq!(machine.stock_level, 10);
        assert_eq!(machine.status, MachineStatus::Active);
    }

    #[tokio::test]
    async fn test_deleted_removes_machine() {
        let (bus, store) = fixture().await;
        bus.publish(Event::created("004", 10)).await;
        bus.publish(Event::deleted("004")).await;
        assert!(store.get("004").await.is_none());

        // Deleting again is a no-op, not a fault.
        bus.publish(Event::deleted("004")).await;
    }

    #[tokio::test]
    async fn test_status_change_updates_existing_machine() {
        let (bus, store) = fixture().await;
        bus.publish(Event::created("004", 10)).await;
        bus.publish(Event::status_changed("004", MachineStatus::Offline))
            .await;

        assert_eq!(
            store.get("004").await.unwrap().status,
            MachineStatus::Offline
        );
    }

    #[tokio::test]
    async fn test_status_change_for_missing_machine_is_noop() {
        let (bus, store) = fixture().await;
        bus.publish(Event::status_changed("404", MachineStatus::Idle))
            .await;
        assert!(store.is_empty().await);
    }
}
