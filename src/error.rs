//! Error types for stock mutations.
//!
//! The bus itself has no error channel — duplicates and handler panics are
//! recovered internally and logged. What remains is the explicit policy
//! around stock invariants: a sale that would drive a machine's stock below
//! zero is rejected, never clamped, so stock-level changes stay auditable.

use thiserror::Error;

/// # Errors produced when applying stock deltas to a machine.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StockError {
    /// The sale quantity exceeds the machine's current stock; the mutation
    /// was rejected and the stock level left unchanged.
    #[error("sale of {quantity} would drive machine {machine} below zero (stock {stock})")]
    InsufficientStock {
        /// Id of the machine the sale targeted.
        machine: String,
        /// Units the sale asked for.
        quantity: u32,
        /// Stock level at the time of the rejected sale.
        stock: u32,
    },
}

impl StockError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            StockError::InsufficientStock { .. } => "insufficient_stock",
        }
    }
}
