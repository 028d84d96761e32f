//! The process-wide list of managers.
//!
//! Applications with several tools keep one [`DockingWindowManager`] per
//! tool. The registry records them in activation order so that code
//! without a manager at hand (dialogs, help) can find the active one.
//!
//! [`DockingWindowManager`]: crate::DockingWindowManager

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use horizon_dock_core::logging::targets;
use parking_lot::Mutex;

use crate::handle::ManagerHandle;

static NEXT_MANAGER_ID: AtomicU64 = AtomicU64::new(1);

static GLOBAL_REGISTRY: OnceLock<Arc<ManagerRegistry>> = OnceLock::new();

/// Identifies a manager within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ManagerId(u64);

impl ManagerId {
    pub(crate) fn next() -> Self {
        Self(NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Entry {
    id: ManagerId,
    handle: ManagerHandle,
    visible: bool,
}

/// Managers in activation order, most recently activated last.
#[derive(Debug, Default)]
pub struct ManagerRegistry {
    entries: Mutex<Vec<Entry>>,
}

static_assertions::assert_impl_all!(ManagerRegistry: Send, Sync);

impl ManagerRegistry {
    /// An isolated registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The process-wide registry, created on first use.
    pub fn global() -> Arc<Self> {
        GLOBAL_REGISTRY.get_or_init(ManagerRegistry::new).clone()
    }

    /// Add a manager as the most recently activated, hidden.
    pub fn register(&self, id: ManagerId, handle: ManagerHandle) {
        let mut entries = self.entries.lock();
        entries.retain(|e| e.id != id);
        entries.push(Entry {
            id,
            handle,
            visible: false,
        });
        tracing::debug!(target: targets::REGISTRY, manager = id.0, "manager registered");
    }

    pub fn unregister(&self, id: ManagerId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        let removed = before != entries.len();
        if removed {
            tracing::debug!(target: targets::REGISTRY, manager = id.0, "manager unregistered");
        }
        removed
    }

    pub fn set_visible(&self, id: ManagerId, visible: bool) {
        if let Some(entry) = self.entries.lock().iter_mut().find(|e| e.id == id) {
            entry.visible = visible;
        }
    }

    /// Move a manager to the back of the list, making it the most recent.
    pub fn set_active(&self, id: ManagerId) {
        let mut entries = self.entries.lock();
        if let Some(index) = entries.iter().position(|e| e.id == id) {
            let entry = entries.remove(index);
            entries.push(entry);
            tracing::trace!(target: targets::REGISTRY, manager = id.0, "manager activated");
        }
    }

    /// The most recently activated visible manager.
    pub fn active(&self) -> Option<ManagerId> {
        self.entries.lock().iter().rev().find(|e| e.visible).map(|e| e.id)
    }

    /// Handle of the active manager.
    pub fn active_handle(&self) -> Option<ManagerHandle> {
        self.entries
            .lock()
            .iter()
            .rev()
            .find(|e| e.visible)
            .map(|e| e.handle.clone())
    }

    pub fn handle(&self, id: ManagerId) -> Option<ManagerHandle> {
        self.entries.lock().iter().find(|e| e.id == id).map(|e| e.handle.clone())
    }

    /// Every registered manager, least recently activated first.
    pub fn all(&self) -> Vec<ManagerId> {
        self.entries.lock().iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::CommandInbox;

    #[test]
    fn test_active_is_last_visible() {
        let registry = ManagerRegistry::new();
        let inbox = CommandInbox::new();
        let (a, b) = (ManagerId::next(), ManagerId::next());
        registry.register(a, inbox.handle());
        registry.register(b, inbox.handle());
        assert_eq!(registry.active(), None);

        registry.set_visible(a, true);
        registry.set_visible(b, true);
        assert_eq!(registry.active(), Some(b));

        registry.set_active(a);
        assert_eq!(registry.active(), Some(a));
        assert_eq!(registry.all(), vec![b, a]);

        registry.set_visible(a, false);
        assert_eq!(registry.active(), Some(b));
        assert!(registry.active_handle().is_some());
    }

    #[test]
    fn test_unregister() {
        let registry = ManagerRegistry::new();
        let inbox = CommandInbox::new();
        let id = ManagerId::next();
        registry.register(id, inbox.handle());
        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        assert!(registry.is_empty());
        assert!(registry.handle(id).is_none());
    }

    #[test]
    fn test_global_is_shared() {
        assert!(Arc::ptr_eq(&ManagerRegistry::global(), &ManagerRegistry::global()));
    }
}
