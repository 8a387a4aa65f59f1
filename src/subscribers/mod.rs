//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the built-in handlers
//! for fleet events delivered through the [`EventBus`](crate::EventBus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   producer ── publish(Event) ──► EventBus ──► dispatch per EventKind
//!                                      │
//!                           ┌──────────┼─────────────────┬────────────┐
//!                           ▼          ▼                 ▼            ▼
//!                     SaleSubscriber  RefillSubscriber  Threshold-   LogWriter
//!                     FleetSubscriber       │           Monitor
//!                           │               │              │
//!                           ▼               ▼              └─► publish(LowStock
//!                        MachineStore (read → mutate copy         / StockOk)
//!                                      → upsert)
//! ```
//!
//! ## Subscriber types
//! - **Mutators** — apply event deltas to the store ([`SaleSubscriber`],
//!   [`RefillSubscriber`], [`FleetSubscriber`])
//! - **Monitors** — derive new events from the ones they observe
//!   ([`ThresholdMonitor`])
//! - **Passive** — observe only ([`LogWriter`])

mod fleet;
mod log;
mod refill;
mod sale;
mod subscribe;
mod threshold;

pub use fleet::FleetSubscriber;
pub use log::LogWriter;
pub use refill::RefillSubscriber;
pub use sale::SaleSubscriber;
pub use subscribe::Subscribe;
pub use threshold::{ThresholdMonitor, LOW_STOCK_THRESHOLD};
