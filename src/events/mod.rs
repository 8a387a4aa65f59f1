//! Event model and the publish/subscribe bus.

mod bus;
mod event;

pub use bus::{EventBus, PublishOutcome, Subscription};
pub use event::{Event, EventId, EventKind, Payload};
