//! Error types for the inventory domain.

use shelfdb_core::CoreError;
use thiserror::Error;

/// Result type for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Errors raised by inventory operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Shipping more than is on hand.
    #[error("cannot ship {requested} of {sku}: only {on_hand} on hand")]
    InsufficientStock {
        /// Item SKU.
        sku: String,
        /// Quantity asked for.
        requested: u32,
        /// Quantity available.
        on_hand: i64,
    },

    /// Receiving more than the quantity field can hold.
    #[error("cannot receive {requested} of {sku}: {on_hand} on hand is at capacity")]
    QuantityOverflow {
        /// Item SKU.
        sku: String,
        /// Quantity received.
        requested: u32,
        /// Quantity on hand before the receipt.
        on_hand: i64,
    },

    /// A negative or non-finite sale price.
    #[error("invalid sale price {price} for {sku}")]
    InvalidPrice {
        /// Item SKU.
        sku: String,
        /// Rejected price.
        price: f64,
    },

    /// An alert could not be delivered.
    #[error("notification failed: {message}")]
    NotificationFailed {
        /// Description of the failure.
        message: String,
    },

    /// Audit log I/O error.
    #[error("audit log error: {0}")]
    Io(#[from] std::io::Error),

    /// Entity management error.
    #[error(transparent)]
    Core(#[from] CoreError),
}
