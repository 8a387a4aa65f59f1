//! # Fleet events delivered through the bus.
//!
//! Events are immutable value objects: constructed once by a producer,
//! pushed through the [`EventBus`](crate::EventBus), and discarded after
//! every registered subscriber has seen them. Each event carries:
//! - [`EventId`] — an opaque unique token used for deduplication, generated
//!   at construction and never reused across distinct logical events;
//! - the id of the machine it concerns;
//! - a [`Payload`] variant with type-specific data.
//!
//! [`EventKind`] is the closed discriminator over payload variants. The bus
//! uses it purely as the registry lookup key — never for run-time type
//! inspection of the payload.
//!
//! ## Stock snapshots
//! Sale and refill events embed a `(stock_before, stock_after)` snapshot
//! captured by the producer at construction time. Handlers compare the
//! snapshot instead of re-reading live store state, so two subscribers
//! observing the same mutation can never disagree on which side of a
//! threshold the transition happened.
//!
//! ## Example
//! ```rust
//! use vendvisor::{Event, EventKind};
//!
//! let ev = Event::sale("001", 2, 5, 3);
//! assert_eq!(ev.kind(), EventKind::Sale);
//! assert_eq!(ev.stock_transition(), Some((5, 3)));
//!
//! // Every construction mints a fresh id.
//! assert_ne!(Event::sale("001", 2, 5, 3).id, ev.id);
//! ```

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::store::MachineStatus;

/// Opaque unique identifier for one logical event.
///
/// Generated at construction ([`Uuid::new_v4`]); the bus keeps delivered ids
/// in a bounded history to make delivery idempotent. Two events constructed
/// separately always carry distinct ids, even when their payloads match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventId(Uuid);

impl EventId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Classification of fleet events.
///
/// Used as the subscription key: handlers register per kind, and the bus
/// dispatches an event to the handler list registered for its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Units sold from a machine (carries a stock snapshot).
    Sale,
    /// Units added to a machine (carries a stock snapshot).
    Refill,
    /// Stock crossed below the low-stock threshold.
    LowStock,
    /// Stock crossed back to or above the low-stock threshold.
    StockOk,
    /// A machine joined the fleet.
    MachineCreated,
    /// A machine left the fleet.
    MachineDeleted,
    /// A machine changed operational status.
    StatusChanged,
}

impl EventKind {
    /// All kinds, in a stable order. Handy for subscribing a catch-all
    /// subscriber such as [`LogWriter`](crate::LogWriter).
    pub const ALL: [EventKind; 7] = [
        EventKind::Sale,
        EventKind::Refill,
        EventKind::LowStock,
        EventKind::StockOk,
        EventKind::MachineCreated,
        EventKind::MachineDeleted,
        EventKind::StatusChanged,
    ];

    /// Returns a short stable label (dotted) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::Sale => "machine.sale",
            EventKind::Refill => "machine.refill",
            EventKind::LowStock => "machine.stock.low",
            EventKind::StockOk => "machine.stock.ok",
            EventKind::MachineCreated => "machine.create",
            EventKind::MachineDeleted => "machine.delete",
            EventKind::StatusChanged => "machine.status.change",
        }
    }
}

/// Type-specific event data.
///
/// A closed union: adding a variant means adding an [`EventKind`] and a
/// constructor on [`Event`], nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Units sold, with the producer-captured stock snapshot.
    Sale {
        quantity: u32,
        stock_before: u32,
        stock_after: u32,
    },
    /// Units refilled, with the producer-captured stock snapshot.
    Refill {
        quantity: u32,
        stock_before: u32,
        stock_after: u32,
    },
    /// Stock dropped below the threshold (derived by the monitor).
    LowStock,
    /// Stock recovered to the threshold or above (derived by the monitor).
    StockOk,
    /// New machine with its initial stock level.
    Created { stock_level: u32 },
    /// Machine removed from the fleet.
    Deleted,
    /// New operational status for an existing machine.
    StatusChanged { status: MachineStatus },
}

/// Immutable fleet event.
///
/// Constructed through the per-variant constructors below; `id` is minted
/// on construction and identifies this logical event for deduplication.
#[derive(Debug, Clone)]
pub struct Event {
    /// Unique token for dedup; never reused across distinct logical events.
    pub id: EventId,
    /// Id of the machine this event concerns.
    pub machine: Arc<str>,
    /// Variant-specific data.
    pub payload: Payload,
}

impl Event {
    fn with_payload(machine: impl Into<Arc<str>>, payload: Payload) -> Self {
        Self {
            id: EventId::generate(),
            machine: machine.into(),
            payload,
        }
    }

    /// A sale of `quantity` units. `stock_before`/`stock_after` must be the
    /// snapshot observed by the producer when it decided on the sale.
    pub fn sale(
        machine: impl Into<Arc<str>>,
        quantity: u32,
        stock_before: u32,
        stock_after: u32,
    ) -> Self {
        Self::with_payload(
            machine,
            Payload::Sale {
                quantity,
                stock_before,
                stock_after,
            },
        )
    }

    /// A refill of `quantity` units, with the producer-observed snapshot.
    pub fn refill(
        machine: impl Into<Arc<str>>,
        quantity: u32,
        stock_before: u32,
        stock_after: u32,
    ) -> Self {
        Self::with_payload(
            machine,
            Payload::Refill {
                quantity,
                stock_before,
                stock_after,
            },
        )
    }

    /// Derived low-stock warning for `machine`.
    pub fn low_stock(machine: impl Into<Arc<str>>) -> Self {
        Self::with_payload(machine, Payload::LowStock)
    }

    /// Derived stock-recovered notification for `machine`.
    pub fn stock_ok(machine: impl Into<Arc<str>>) -> Self {
        Self::with_payload(machine, Payload::StockOk)
    }

    /// A new machine entering the fleet with `stock_level` units on board.
    pub fn created(machine: impl Into<Arc<str>>, stock_level: u32) -> Self {
        Self::with_payload(machine, Payload::Created { stock_level })
    }

    /// A machine leaving the fleet.
    pub fn deleted(machine: impl Into<Arc<str>>) -> Self {
        Self::with_payload(machine, Payload::Deleted)
    }

    /// A status transition for an existing machine.
    pub fn status_changed(machine: impl Into<Arc<str>>, status: MachineStatus) -> Self {
        Self::with_payload(machine, Payload::StatusChanged { status })
    }

    /// Stable discriminator for this event; the bus's registry key.
    pub fn kind(&self) -> EventKind {
        match self.payload {
            Payload::Sale { .. } => EventKind::Sale,
            Payload::Refill { .. } => EventKind::Refill,
            Payload::LowStock => EventKind::LowStock,
            Payload::StockOk => EventKind::StockOk,
            Payload::Created { .. } => EventKind::MachineCreated,
            Payload::Deleted => EventKind::MachineDeleted,
            Payload::StatusChanged { .. } => EventKind::StatusChanged,
        }
    }

    /// The `(stock_before, stock_after)` snapshot for sale/refill events,
    /// `None` for every other variant.
    pub fn stock_transition(&self) -> Option<(u32, u32)> {
        match self.payload {
            Payload::Sale {
                stock_before,
                stock_after,
                ..
            }
            | Payload::Refill {
                stock_before,
                stock_after,
                ..
            } => Some((stock_before, stock_after)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_payload() {
        assert_eq!(Event::sale("m", 1, 5, 4).kind(), EventKind::Sale);
        assert_eq!(Event::refill("m", 3, 2, 5).kind(), EventKind::Refill);
        assert_eq!(Event::low_stock("m").kind(), EventKind::LowStock);
        assert_eq!(Event::stock_ok("m").kind(), EventKind::StockOk);
        assert_eq!(Event::created("m", 10).kind(), EventKind::MachineCreated);
        assert_eq!(Event::deleted("m").kind(), EventKind::MachineDeleted);
        assert_eq!(
            Event::status_changed("m", MachineStatus::Idle).kind(),
            EventKind::StatusChanged
        );
    }

    #[test]
    fn test_each_construction_mints_fresh_id() {
        let a = Event::sale("001", 2, 5, 3);
        let b = Event::sale("001", 2, 5, 3);
        assert_ne!(a.id, b.id, "identical payloads must still get distinct ids");
    }

    #[test]
    fn test_stock_transition_only_on_sale_and_refill() {
        assert_eq!(Event::sale("m", 2, 5, 3).stock_transition(), Some((5, 3)));
        assert_eq!(Event::refill("m", 3, 2, 5).stock_transition(), Some((2, 5)));
        assert_eq!(Event::low_stock("m").stock_transition(), None);
        assert_eq!(Event::created("m", 10).stock_transition(), None);
    }

    #[test]
    fn test_cloned_event_keeps_id() {
        let ev = Event::refill("002", 3, 1, 4);
        let dup = ev.clone();
        assert_eq!(ev.id, dup.id);
    }
}
