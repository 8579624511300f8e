//! Low-stock alerts.

use crate::error::InventoryResult;
use crate::item::InventoryItem;
use parking_lot::Mutex;
use shelfdb_core::{CommitObserver, EntityManager};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Quantity below which an item counts as low.
pub const DEFAULT_THRESHOLD: i64 = 5;

/// An item whose quantity dropped below the threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAlert {
    /// Item SKU.
    pub sku: String,
    /// Quantity on hand at commit time.
    pub quantity: i64,
    /// Threshold that was crossed.
    pub threshold: i64,
}

impl fmt::Display for StockAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is low on stock: {} on hand (threshold {})",
            self.sku, self.quantity, self.threshold
        )
    }
}

/// Delivers stock alerts somewhere a person will see them.
pub trait Notifier: Send + Sync {
    /// Delivers one alert.
    ///
    /// # Errors
    ///
    /// Implementation-defined delivery failure.
    fn notify(&self, alert: &StockAlert) -> InventoryResult<()>;
}

/// Keeps every alert in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<StockAlert>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Alerts received so far, oldest first.
    #[must_use]
    pub fn alerts(&self) -> Vec<StockAlert> {
        self.alerts.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, alert: &StockAlert) -> InventoryResult<()> {
        self.alerts.lock().push(alert.clone());
        Ok(())
    }
}

/// Emits alerts as `warn!` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, alert: &StockAlert) -> InventoryResult<()> {
        warn!(
            sku = %alert.sku,
            quantity = alert.quantity,
            threshold = alert.threshold,
            "low stock"
        );
        Ok(())
    }
}

/// Raises a [`StockAlert`] for every pending [`InventoryItem`] whose
/// quantity is below the threshold.
///
/// Other entity types are ignored. An item that stays low is reported on
/// every commit that saves it.
pub struct LowStockAlert {
    threshold: i64,
    notifier: Arc<dyn Notifier>,
}

impl LowStockAlert {
    /// Alerts below [`DEFAULT_THRESHOLD`].
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self::with_threshold(DEFAULT_THRESHOLD, notifier)
    }

    /// Alerts below `threshold`.
    #[must_use]
    pub fn with_threshold(threshold: i64, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            threshold,
            notifier,
        }
    }

    /// The configured threshold.
    #[must_use]
    pub fn threshold(&self) -> i64 {
        self.threshold
    }
}

impl CommitObserver for LowStockAlert {
    fn on_commit(&self, manager: &EntityManager) {
        let low = manager
            .pending_save_ids()
            .iter()
            .filter_map(|id| manager.entity::<InventoryItem>(*id))
            .filter(|item| item.quantity < self.threshold);

        for item in low {
            let alert = StockAlert {
                sku: item.sku.clone(),
                quantity: item.quantity,
                threshold: self.threshold,
            };
            if let Err(e) = self.notifier.notify(&alert) {
                warn!(sku = %alert.sku, error = %e, "failed to deliver stock alert");
            }
        }
    }
}

impl fmt::Debug for LowStockAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LowStockAlert")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}
