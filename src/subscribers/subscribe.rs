//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging handlers into the
//! [`EventBus`](crate::EventBus). Handlers run sequentially inside the bus's
//! single drain loop, in subscription order for the event's kind.
//!
//! ## Contract
//! - Expected conditions (a machine that no longer exists, a stale event)
//!   are handled as no-ops inside the handler — never surfaced as failures.
//! - Unexpected panics are caught at the bus's dispatch boundary and logged;
//!   the remaining handlers still run.
//! - The `bus` argument is the handle handlers use to publish derived
//!   events. A publish from inside `on_event` is re-entrant: it enqueues and
//!   returns, and the in-flight drain delivers it after the current queue.
//! - A handler that never completes stalls the bus's drain loop; there is no
//!   timeout around handler execution.
//!
//! ## Example (skeleton)
//! ```rust
//! use async_trait::async_trait;
//! use vendvisor::{Event, EventBus, Subscribe};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Subscribe for Audit {
//!     async fn on_event(&self, event: &Event, _bus: &EventBus) {
//!         // write audit record...
//!         let _ = event;
//!     }
//!     fn name(&self) -> &'static str { "audit" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventBus};

/// Contract for event handlers.
///
/// Called from the bus's drain loop. Implementations should avoid blocking
/// the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single event.
    ///
    /// # Parameters
    /// - `event`: the event in flight (borrowed, immutable)
    /// - `bus`: handle for publishing derived events
    async fn on_event(&self, event: &Event, bus: &EventBus);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
