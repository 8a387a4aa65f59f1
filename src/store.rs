//! # Machine entity store.
//!
//! [`MachineStore`] holds machine records keyed by id. It is an external
//! collaborator of the bus: consumed by handlers, never owned by the bus.
//!
//! ## Rules
//! - Lookups return **clones**: there is no shared mutable aliasing across
//!   calls. Every read-modify-write is read → mutate the copy →
//!   [`upsert`](MachineStore::upsert) it back.
//! - The bus serializes handler execution, so the store never sees two
//!   in-flight events mutating it at once; the `RwLock` only guards against
//!   producers touching the store while a drain is running.
//! - A missing id is an expected condition (`None`), not an error.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::StockError;

/// Stock a freshly created machine starts with, unless specified.
pub const DEFAULT_STOCK_LEVEL: u32 = 10;

/// Operational status of a vending machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineStatus {
    /// Serving customers.
    Active,
    /// Powered, not serving.
    Idle,
    /// Unreachable.
    Offline,
}

impl MachineStatus {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            MachineStatus::Active => "active",
            MachineStatus::Idle => "idle",
            MachineStatus::Offline => "offline",
        }
    }
}

/// One vending machine record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    /// Fleet-unique machine id.
    pub id: Arc<str>,
    /// Units on board; structurally never negative.
    pub stock_level: u32,
    /// Current operational status.
    pub status: MachineStatus,
}

impl Machine {
    /// Creates a machine with [`DEFAULT_STOCK_LEVEL`] units, active.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self::with_stock(id, DEFAULT_STOCK_LEVEL)
    }

    /// Creates an active machine with the given stock level.
    pub fn with_stock(id: impl Into<Arc<str>>, stock_level: u32) -> Self {
        Self {
            id: id.into(),
            stock_level,
            status: MachineStatus::Active,
        }
    }

    /// Deducts a sale from the stock level.
    ///
    /// Rejects (leaving the stock unchanged) when `quantity` exceeds the
    /// current level — the never-negative invariant is enforced by refusing
    /// the mutation, not by clamping.
    pub fn apply_sale(&mut self, quantity: u32) -> Result<(), StockError> {
        match self.stock_level.checked_sub(quantity) {
            Some(remaining) => {
                self.stock_level = remaining;
                Ok(())
            }
            None => Err(StockError::InsufficientStock {
                machine: self.id.to_string(),
                quantity,
                stock: self.stock_level,
            }),
        }
    }

    /// Adds a refill to the stock level (saturating at `u32::MAX`).
    pub fn apply_refill(&mut self, quantity: u32) {
        self.stock_level = self.stock_level.saturating_add(quantity);
    }
}

/// In-memory store of machine records, keyed by id.
#[derive(Default)]
pub struct MachineStore {
    machines: RwLock<HashMap<Arc<str>, Machine>>,
}

impl MachineStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `machines`.
    pub fn with_machines(machines: impl IntoIterator<Item = Machine>) -> Self {
        Self {
            machines: RwLock::new(
                machines
                    .into_iter()
                    .map(|m| (Arc::clone(&m.id), m))
                    .collect(),
            ),
        }
    }

    /// Returns a clone of the machine with `id`, if present.
    ///
    /// Mutations to the clone are invisible until written back with
    /// [`upsert`](Self::upsert).
    pub async fn get(&self, id: &str) -> Option<Machine> {
        let machines = self.machines.read().await;
        machines.get(id).cloned()
    }

    /// Returns clones of all machines, sorted by id.
    pub async fn list(&self) -> Vec<Machine> {
        let machines = self.machines.read().await;
        let mut all: Vec<Machine> = machines.values().cloned().collect();
        all.sort_unstable_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Inserts `machine`, replacing any record with the same id.
    pub async fn upsert(&self, machine: Machine) {
        let mut machines = self.machines.write().await;
        machines.insert(Arc::clone(&machine.id), machine);
    }

    /// Removes the machine with `id`; returns whether a record existed.
    /// Removing an unknown id is a no-op.
    pub async fn remove(&self, id: &str) -> bool {
        let mut machines = self.machines.write().await;
        machines.remove(id).is_some()
    }

    /// Number of machines in the fleet.
    pub async fn len(&self) -> usize {
        self.machines.read().await.len()
    }

    /// Returns true if the fleet is empty.
    pub async fn is_empty(&self) -> bool {
        self.machines.read().await.is_empty()
    }
}
