//! # Random sale/refill producer for demos and soak tests.
//!
//! [`EventGenerator`] picks a random machine from the store, flips a coin
//! between sale and refill, and constructs the event with an accurate
//! `(stock_before, stock_after)` snapshot read from the live stock level —
//! capturing the snapshot is the producer's job, handlers never recompute
//! it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::events::Event;
use crate::store::MachineStore;

/// Random event producer over a fleet.
///
/// Sale quantity is 1 or 2, refill quantity 3 or 5. A sale is capped at the
/// machine's current stock (an empty machine gets a refill instead), so
/// generated snapshots always describe a mutation the sale handler will
/// accept.
pub struct EventGenerator {
    rng: StdRng,
}

impl EventGenerator {
    /// Generator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Constructs the next random event against the current fleet state.
    ///
    /// Returns `None` when the store holds no machines.
    pub async fn next_event(&mut self, store: &MachineStore) -> Option<Event> {
        let machines = store.list().await;
        if machines.is_empty() {
            return None;
        }
        let machine = &machines[self.rng.gen_range(0..machines.len())];
        let before = machine.stock_level;

        let sale = self.rng.gen_bool(0.5) && before > 0;
        let event = if sale {
            let quantity = if self.rng.gen_bool(0.5) { 1 } else { 2 };
            let quantity = quantity.min(before);
            Event::sale(machine.id.clone(), quantity, before, before - quantity)
        } else {
            let quantity = if self.rng.gen_bool(0.5) { 3 } else { 5 };
            Event::refill(
                machine.id.clone(),
                quantity,
                before,
                before.saturating_add(quantity),
            )
        };
        Some(event)
    }
}

impl Default for EventGenerator {
    fn default() -> Self {
        Self::new()
    }
}
