//! Commit observers for the inventory domain.

mod audit;
mod low_stock;

pub use audit::AuditLog;
pub use low_stock::{
    LogNotifier, LowStockAlert, Notifier, RecordingNotifier, StockAlert, DEFAULT_THRESHOLD,
};
