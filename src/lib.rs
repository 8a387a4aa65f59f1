//! # vendvisor
//!
//! **Vendvisor** models a small fleet of stock-tracked vending machines
//! reacting to sale and refill events through an in-process
//! publish/subscribe bus.
//!
//! The core is the [`EventBus`]: reliable, ordered, exactly-once-per-publish
//! delivery of events to interested handlers, plus the edge-triggered
//! [`ThresholdMonitor`] that never duplicates or misses a low-stock
//! notification even when several handlers observe the same transition.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌──────────────┐   ┌──────────────┐   ┌───────────────────┐
//!   │EventGenerator│   │ test harness │   │ ThresholdMonitor  │
//!   │  (producer)  │   │  (producer)  │   │(derived producer) │
//!   └──────┬───────┘   └──────┬───────┘   └──────┬────────────┘
//!          ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  EventBus                                                         │
//! │  - dedup window (bounded FIFO of delivered EventIds)              │
//! │  - FIFO queue of pending events                                   │
//! │  - registry: EventKind → ordered handler list                     │
//! │  - single-flight drain loop                                       │
//! └──────┬──────────────┬──────────────┬──────────────┬───────────────┘
//!        ▼              ▼              ▼              ▼
//!  SaleSubscriber RefillSubscriber ThresholdMonitor LogWriter
//!  FleetSubscriber      │              │
//!        │              │              └─ publish(LowStock / StockOk)
//!        ▼              ▼                 (queued behind the in-flight
//!     MachineStore (read → mutate copy → upsert)          drain)
//! ```
//!
//! ### Delivery guarantees
//! ```text
//! publish(event)
//!   ├─ duplicate id          ─► Duplicate   (no handlers run, ever again)
//!   ├─ drain already running ─► Enqueued    (breadth-first pickup)
//!   └─ otherwise             ─► drains to empty, global FIFO order,
//!                               handlers sequential in subscription order,
//!                               panics isolated per handler
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                       |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------|
//! | **Bus**           | FIFO, idempotent, single-flight event delivery.              | [`EventBus`], [`PublishOutcome`]          |
//! | **Subscriber API**| Hook into fleet events (mutation, monitoring, logging).      | [`Subscribe`], [`Subscription`]           |
//! | **Events**        | Closed tagged union with producer-captured stock snapshots.  | [`Event`], [`EventKind`], [`Payload`]     |
//! | **Store**         | Machine records, copy-on-read with explicit write-back.      | [`MachineStore`], [`Machine`]             |
//! | **Monitoring**    | Edge-triggered low-stock / stock-ok notifications.           | [`ThresholdMonitor`]                      |
//! | **Configuration** | Dedup window sizing.                                         | [`BusConfig`]                             |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use vendvisor::{
//!     BusConfig, Event, EventBus, EventKind, Machine, MachineStore,
//!     SaleSubscriber, ThresholdMonitor,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let store = Arc::new(MachineStore::with_machines([Machine::new("001")]));
//!     let bus = EventBus::new(BusConfig::default());
//!
//!     bus.subscribe(EventKind::Sale, Arc::new(SaleSubscriber::new(store.clone())))
//!         .await;
//!     let monitor = Arc::new(ThresholdMonitor::new());
//!     bus.subscribe(EventKind::Sale, monitor.clone()).await;
//!     bus.subscribe(EventKind::Refill, monitor).await;
//!
//!     // Stock 10 -> 2: the mutator persists the new level and the monitor
//!     // publishes one LowStock for the downward crossing.
//!     bus.publish(Event::sale("001", 8, 10, 2)).await;
//!
//!     assert_eq!(store.get("001").await.unwrap().stock_level, 2);
//! }
//! ```

mod config;
mod error;
mod events;
mod generator;
mod store;
mod subscribers;

// ---- Public re-exports ----

pub use config::BusConfig;
pub use error::StockError;
pub use events::{Event, EventBus, EventId, EventKind, Payload, PublishOutcome, Subscription};
pub use generator::EventGenerator;
pub use store::{Machine, MachineStatus, MachineStore, DEFAULT_STOCK_LEVEL};
pub use subscribers::{
    FleetSubscriber, LogWriter, RefillSubscriber, SaleSubscriber, Subscribe, ThresholdMonitor,
    LOW_STOCK_THRESHOLD,
};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex as StdMutex};

    struct Recorder {
        seen: StdMutex<Vec<(EventKind, Arc<str>)>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event, _bus: &EventBus) {
            self.seen
                .lock()
                .unwrap()
                .push((event.kind(), event.machine.clone()));
        }
    }

    /// Full wiring: mutators + monitor over one machine, driven through the
    /// exact sale/refill sequence of the acceptance scenario.
    #[tokio::test]
    async fn test_end_to_end_crossings() {
        let store = Arc::new(MachineStore::with_machines([Machine::with_stock(
            "m1", 10,
        )]));
        let bus = EventBus::new(BusConfig::default());

        bus.subscribe(EventKind::Sale, Arc::new(SaleSubscriber::new(store.clone())))
            .await;
        bus.subscribe(
            EventKind::Refill,
            Arc::new(RefillSubscriber::new(store.clone())),
        )
        .await;
        let monitor = Arc::new(ThresholdMonitor::new());
        bus.subscribe(EventKind::Sale, monitor.clone()).await;
        bus.subscribe(EventKind::Refill, monitor).await;

        let rec = Arc::new(Recorder {
            seen: StdMutex::new(Vec::new()),
        });
        bus.subscribe(EventKind::LowStock, rec.clone()).await;
        bus.subscribe(EventKind::StockOk, rec.clone()).await;

        // Sale(8): 10 -> 2, one LowStock.
        bus.publish(Event::sale("m1", 8, 10, 2)).await;
        assert_eq!(store.get("m1").await.unwrap().stock_level, 2);

        // Refill(3): 2 -> 5, one StockOk.
        bus.publish(Event::refill("m1", 3, 2, 5)).await;
        assert_eq!(store.get("m1").await.unwrap().stock_level, 5);

        // Sale(1): 5 -> 4, nothing derived.
        bus.publish(Event::sale("m1", 1, 5, 4)).await;
        assert_eq!(store.get("m1").await.unwrap().stock_level, 4);

        let seen = rec.seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            &[
                (EventKind::LowStock, Arc::from("m1")),
                (EventKind::StockOk, Arc::from("m1")),
            ],
        );
    }

    /// The generator end of the pipeline: random events keep every invariant
    /// the handlers rely on.
    #[tokio::test]
    async fn test_generated_traffic_never_drives_stock_negative() {
        let store = Arc::new(MachineStore::with_machines([
            Machine::with_stock("001", 3),
            Machine::with_stock("002", 0),
            Machine::with_stock("003", 10),
        ]));
        let bus = EventBus::new(BusConfig::default());
        bus.subscribe(EventKind::Sale, Arc::new(SaleSubscriber::new(store.clone())))
            .await;
        bus.subscribe(
            EventKind::Refill,
            Arc::new(RefillSubscriber::new(store.clone())),
        )
        .await;

        let mut generator = EventGenerator::with_seed(1234);
        for _ in 0..100 {
            if let Some(event) = generator.next_event(&store).await {
                assert_eq!(bus.publish(event).await, PublishOutcome::Delivered);
            }
        }
        assert_eq!(store.len().await, 3);
    }
}
