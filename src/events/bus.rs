//! # Event bus with single-flight draining and idempotent delivery.
//!
//! [`EventBus`] is the core of the crate: a FIFO queue of pending events, a
//! registry mapping [`EventKind`] to an ordered handler list, a bounded
//! dedup window keyed by [`EventId`], and a single-flight drain loop.
//!
//! ## Architecture
//! ```text
//! publish(event)
//!     │
//!     ├─ id already in dedup window ──► Duplicate (no handlers invoked)
//!     │
//!     ├─ record id, push event on FIFO queue
//!     │
//!     ├─ drain in flight? ──► Enqueued (in-flight drain picks it up)
//!     │
//!     └─ otherwise drain until the queue is empty:
//!            pop front ──► snapshot handlers for its kind
//!                              │
//!                              ├──► handler 1.on_event()  (awaited)
//!                              ├──► handler 2.on_event()  (panic caught,
//!                              └──► handler N.on_event()   delivery continues)
//! ```
//!
//! ## Rules
//! - **Global FIFO**: events are delivered in the exact order `publish`
//!   accepted them, across all kinds.
//! - **Subscription order**: within one event, handlers run sequentially in
//!   the order they subscribed for that kind.
//! - **Single-flight**: one logical drain loop per bus. A handler that
//!   publishes re-enters `publish`, which only enqueues — derived events are
//!   processed after the current queue drains (breadth-first, bounded stack).
//! - **Idempotent**: a re-published id inside the dedup window is discarded
//!   silently; the window is a bounded FIFO, oldest id evicted first.
//! - **Isolation**: a panicking handler is caught and logged; remaining
//!   handlers and the drain loop are unaffected.
//! - **Snapshot dispatch**: subscribing or unsubscribing during a dispatch
//!   never changes the handler list already snapshotted for the event in
//!   flight.
//!
//! One mutex guards the queue, the drain flag, and the dedup window, so the
//! flag is set and cleared with the same happens-before ordering as the
//! queue mutations. The lock is never held across a handler await: enqueue
//! stays O(1) for concurrent publishers regardless of drain progress.
//!
//! ## Known limitation
//! A handler that never completes stalls the drain loop. There is no
//! cancellation or timeout around handler execution at this scale.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Weak};

use futures::FutureExt;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error};

use crate::config::BusConfig;
use crate::events::{Event, EventId, EventKind};
use crate::subscribers::Subscribe;

/// Global counter for registration identities.
static REGISTRATION_SEQ: AtomicU64 = AtomicU64::new(0);

/// Result of [`EventBus::publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The event (and everything it transitively triggered) was delivered;
    /// this call ran the drain loop to an empty queue.
    Delivered,
    /// The event was queued behind an in-flight drain (re-entrant publish
    /// from inside a handler, or a concurrent publisher) and will be
    /// delivered by that drain.
    Enqueued,
    /// The event id was already delivered; no handlers were invoked.
    Duplicate,
}

impl PublishOutcome {
    /// `true` when the event was discarded by the dedup window.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, PublishOutcome::Duplicate)
    }
}

/// One handler registration; `id` ties it to its [`Subscription`].
struct Registration {
    id: u64,
    handler: Arc<dyn Subscribe>,
}

/// Bounded FIFO of recently delivered event ids.
struct DedupWindow {
    capacity: usize,
    order: VecDeque<EventId>,
    seen: HashSet<EventId>,
}

impl DedupWindow {
    fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    fn contains(&self, id: &EventId) -> bool {
        self.seen.contains(id)
    }

    /// Records `id`, evicting the oldest entry once over capacity.
    fn record(&mut self, id: EventId) {
        self.order.push_back(id.clone());
        self.seen.insert(id);
        if self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.seen.remove(&evicted);
            }
        }
    }
}

/// Queue, drain flag, and dedup window — mutated together under one lock.
struct DispatchState {
    queue: VecDeque<Event>,
    draining: bool,
    history: DedupWindow,
}

struct Inner {
    state: Mutex<DispatchState>,
    registry: RwLock<HashMap<EventKind, Vec<Registration>>>,
}

/// In-process publish/subscribe bus for fleet events.
///
/// Explicitly constructed and passed by reference (or cheap clone) to
/// whoever needs it; lifecycle is tied to the owning scope, there is no
/// global instance.
///
/// ### Properties
/// - **Cloneable**: internally `Arc`-backed; clones share queue, registry,
///   and dedup window.
/// - **Fire-and-forget**: handler failures are logged, never propagated to
///   the publisher.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

/// Capability returned by [`EventBus::subscribe`].
///
/// Cancelling removes exactly the registration that produced it, even when
/// the same handler is registered more than once for the same kind. Holds
/// only a weak handle: a token outliving its bus cancels to a no-op.
/// Dropping the token without cancelling leaves the subscription in place.
pub struct Subscription {
    inner: Weak<Inner>,
    kind: EventKind,
    id: u64,
}

impl Subscription {
    /// Removes the registration this token was issued for. Idempotent:
    /// cancelling an already-removed registration is a no-op.
    pub async fn cancel(self) {
        if let Some(inner) = self.inner.upgrade() {
            let mut registry = inner.registry.write().await;
            if let Some(regs) = registry.get_mut(&self.kind) {
                regs.retain(|r| r.id != self.id);
            }
        }
    }
}

impl EventBus {
    /// Creates a new bus with the given configuration.
    pub fn new(config: BusConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(DispatchState {
                    queue: VecDeque::new(),
                    draining: false,
                    history: DedupWindow::new(config.dedup_capacity),
                }),
                registry: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Registers `handler` for events of `kind`.
    ///
    /// Registration order defines delivery order for that kind. The same
    /// handler may be registered for several kinds (or several times for
    /// one kind; it then runs once per registration).
    pub async fn subscribe(&self, kind: EventKind, handler: Arc<dyn Subscribe>) -> Subscription {
        let id = REGISTRATION_SEQ.fetch_add(1, AtomicOrdering::Relaxed);
        let mut registry = self.inner.registry.write().await;
        registry
            .entry(kind)
            .or_default()
            .push(Registration { id, handler });
        Subscription {
            inner: Arc::downgrade(&self.inner),
            kind,
            id,
        }
    }

    /// Removes every registration of `handler` for `kind`, matched by
    /// handler identity. Idempotent: unsubscribing a handler that is not
    /// registered is a no-op, never an error.
    pub async fn unsubscribe(&self, kind: EventKind, handler: &Arc<dyn Subscribe>) {
        let mut registry = self.inner.registry.write().await;
        if let Some(regs) = registry.get_mut(&kind) {
            regs.retain(|r| !Arc::ptr_eq(&r.handler, handler));
        }
    }

    /// Number of handlers currently registered for `kind`.
    pub async fn subscriber_count(&self, kind: EventKind) -> usize {
        let registry = self.inner.registry.read().await;
        registry.get(&kind).map_or(0, Vec::len)
    }

    /// Kinds with at least one registered handler, sorted by label.
    pub async fn kinds(&self) -> Vec<EventKind> {
        let registry = self.inner.registry.read().await;
        let mut kinds: Vec<EventKind> = registry
            .iter()
            .filter(|(_, regs)| !regs.is_empty())
            .map(|(kind, _)| *kind)
            .collect();
        kinds.sort_unstable_by_key(|k| k.as_label());
        kinds
    }

    /// Accepts `event` for delivery.
    ///
    /// Returns [`PublishOutcome::Duplicate`] without invoking any handler
    /// when the id was already delivered. Otherwise the event is queued; if
    /// no drain is in flight, this call drains the queue to empty (including
    /// events handlers publish along the way) and returns
    /// [`PublishOutcome::Delivered`], else [`PublishOutcome::Enqueued`].
    pub async fn publish(&self, event: Event) -> PublishOutcome {
        {
            let mut state = self.inner.state.lock().await;
            if state.history.contains(&event.id) {
                debug!(
                    kind = event.kind().as_label(),
                    machine = %event.machine,
                    id = %event.id,
                    "duplicate event discarded"
                );
                return PublishOutcome::Duplicate;
            }
            state.history.record(event.id.clone());
            state.queue.push_back(event);
            if state.draining {
                return PublishOutcome::Enqueued;
            }
            state.draining = true;
        }

        self.drain().await;
        PublishOutcome::Delivered
    }

    /// Pops and dispatches until the queue is empty, then clears the drain
    /// flag. Only ever entered by the one `publish` call that flipped the
    /// flag.
    async fn drain(&self) {
        loop {
            let event = {
                let mut state = self.inner.state.lock().await;
                match state.queue.pop_front() {
                    Some(event) => event,
                    None => {
                        state.draining = false;
                        return;
                    }
                }
            };
            self.dispatch(&event).await;
        }
    }

    /// Runs every handler registered for the event's kind, sequentially, on
    /// a snapshot of the registry taken at the moment of dispatch.
    async fn dispatch(&self, event: &Event) {
        let snapshot: Vec<Arc<dyn Subscribe>> = {
            let registry = self.inner.registry.read().await;
            registry
                .get(&event.kind())
                .map(|regs| regs.iter().map(|r| Arc::clone(&r.handler)).collect())
                .unwrap_or_default()
        };

        for handler in snapshot {
            let fut = handler.on_event(event, self);
            if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                let info = {
                    let any = &*panic_err;
                    if let Some(msg) = any.downcast_ref::<&'static str>() {
                        (*msg).to_string()
                    } else if let Some(msg) = any.downcast_ref::<String>() {
                        msg.clone()
                    } else {
                        "unknown panic".to_string()
                    }
                };
                error!(
                    kind = event.kind().as_label(),
                    machine = %event.machine,
                    subscriber = handler.name(),
                    panic = %info,
                    "subscriber panicked during dispatch; delivery continues"
                );
            }
        }
    }
}
