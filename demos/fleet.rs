//! Seeds a small fleet and pushes random sale/refill events through the bus.
//!
//! Run with: `cargo run --example fleet`

use std::sync::Arc;

use vendvisor::{
    BusConfig, Event, EventBus, EventGenerator, EventKind, FleetSubscriber, LogWriter, Machine,
    MachineStatus, MachineStore, RefillSubscriber, SaleSubscriber, ThresholdMonitor,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vendvisor=debug".into()),
        )
        .init();

    let store = Arc::new(MachineStore::with_machines([
        Machine::new("001"),
        Machine::new("002"),
        Machine::new("003"),
    ]));
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

    let fleet = Arc::new(FleetSubscriber::new(store.clone()));
    bus.subscribe(EventKind::MachineCreated, fleet.clone()).await;
    bus.subscribe(EventKind::MachineDeleted, fleet.clone()).await;
    bus.subscribe(EventKind::StatusChanged, fleet).await;

    let log = Arc::new(LogWriter);
    for kind in EventKind::ALL {
        bus.subscribe(kind, log.clone()).await;
    }

    // Some fleet churn before the random traffic.
    bus.publish(Event::created("004", 5)).await;
    bus.publish(Event::status_changed("002", MachineStatus::Idle))
        .await;

    let mut generator = EventGenerator::new();
    for _ in 0..10 {
        if let Some(event) = generator.next_event(&store).await {
            bus.publish(event).await;
        }
    }

    bus.publish(Event::deleted("004")).await;

    println!("--- final fleet state ---");
    for machine in store.list().await {
        println!(
            "machine={} stock={} status={}",
            machine.id,
            machine.stock_level,
            machine.status.as_label(),
        );
    }
}
