//! # Bus configuration.
//!
//! [`BusConfig`] sizes the dedup window the bus keeps to make delivery
//! idempotent per [`EventId`](crate::EventId).
//!
//! # Example
//! ```
//! use vendvisor::BusConfig;
//!
//! let mut cfg = BusConfig::default();
//! cfg.dedup_capacity = 64;
//!
//! assert_eq!(cfg.dedup_capacity, 64);
//! ```

/// Configuration for an [`EventBus`](crate::EventBus) instance.
#[derive(Clone, Copy, Debug)]
pub struct BusConfig {
    /// Capacity of the dedup window (bounded FIFO of delivered event ids).
    ///
    /// Once full, the oldest id is evicted and may be delivered again if
    /// re-published. The minimum effective capacity is 1 (clamped).
    pub dedup_capacity: usize,
}

impl Default for BusConfig {
    /// Provides a default configuration:
    /// - `dedup_capacity = 1024`
    fn default() -> Self {
        Self {
            dedup_capacity: 1024,
        }
    }
}
