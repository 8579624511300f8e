//! Commit observers.
//!
//! Observers are notified once per [`EntityManager::commit`] call, in the
//! order they were attached. They receive the manager by shared reference,
//! so they can read the pending-save list and resolve entities but cannot
//! change anything while a commit is in flight.
//!
//! [`EntityManager::commit`]: crate::EntityManager::commit

use crate::manager::EntityManager;
use std::sync::Arc;

/// A listener invoked on every commit.
///
/// Observers that keep state use interior mutability. Failures inside an
/// observer are the observer's to handle; the commit does not look at them.
///
/// Closures taking `&EntityManager` implement this trait:
///
/// ```
/// use shelfdb_core::{CommitObserver, EntityManager};
/// use std::sync::Arc;
///
/// let observer: Arc<dyn CommitObserver> = Arc::new(|manager: &EntityManager| {
///     println!("{} entities pending", manager.pending_save_ids().len());
/// });
/// ```
pub trait CommitObserver: Send + Sync {
    /// Called after the pending entities were staged into the store.
    fn on_commit(&self, manager: &EntityManager);
}

impl<F> CommitObserver for F
where
    F: Fn(&EntityManager) + Send + Sync,
{
    fn on_commit(&self, manager: &EntityManager) {
        self(manager);
    }
}

/// Ordered, identity-deduplicated list of observers.
#[derive(Default, Clone)]
pub(crate) struct ObserverSet {
    observers: Vec<Arc<dyn CommitObserver>>,
}

impl ObserverSet {
    /// Adds `observer` unless that same allocation is already attached.
    ///
    /// Returns `true` if it was added.
    pub(crate) fn attach(&mut self, observer: Arc<dyn CommitObserver>) -> bool {
        if self.position(&observer).is_some() {
            return false;
        }
        self.observers.push(observer);
        true
    }

    /// Removes `observer` if attached. Returns `true` if it was removed.
    pub(crate) fn detach(&mut self, observer: &Arc<dyn CommitObserver>) -> bool {
        match self.position(observer) {
            Some(index) => {
                self.observers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the attached observers in attachment order.
    pub(crate) fn snapshot(&self) -> Vec<Arc<dyn CommitObserver>> {
        self.observers.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    // Compares data pointers only; vtable pointers for the same type may
    // differ between codegen units.
    fn position(&self, observer: &Arc<dyn CommitObserver>) -> Option<usize> {
        let target = Arc::as_ptr(observer).cast::<()>();
        self.observers
            .iter()
            .position(|o| Arc::as_ptr(o).cast::<()>() == target)
    }
}
