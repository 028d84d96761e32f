//! Thread affinity verification.
//!
//! A docking window manager is a single-threaded actor: its tree, focus
//! pointers and action registrations may only be touched from the thread that
//! created it. [`ThreadAffinity`] records that thread and checks it.
//!
//! ```
//! use horizon_dock_core::thread_check::ThreadAffinity;
//!
//! struct Layout {
//!     affinity: ThreadAffinity,
//!     generation: std::cell::Cell<u64>,
//! }
//!
//! impl Layout {
//!     fn bump(&self) {
//!         self.affinity.debug_assert_same_thread();
//!         self.generation.set(self.generation.get() + 1);
//!     }
//! }
//!
//! let layout = Layout { affinity: ThreadAffinity::current(), generation: Default::default() };
//! layout.bump();
//! ```

use std::thread::ThreadId;

/// Records the thread an object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Create a new thread affinity tracker for the current thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// Get the thread ID this affinity is bound to.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Check if the current thread matches this affinity.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Assert that we are on the same thread as the affinity.
    ///
    /// This always runs (debug and release builds).
    ///
    /// # Panics
    ///
    /// Panics with a descriptive message if called from a different thread.
    #[inline]
    pub fn assert_same_thread(&self) {
        if !self.is_same_thread() {
            self.panic_wrong_thread();
        }
    }

    /// Debug-only assertion that we are on the same thread.
    ///
    /// This is a no-op in release builds.
    #[inline]
    pub fn debug_assert_same_thread(&self) {
        #[cfg(debug_assertions)]
        self.assert_same_thread();
    }

    #[cold]
    #[inline(never)]
    fn panic_wrong_thread(&self) -> ! {
        let current = std::thread::current();
        let current_name = current.name().unwrap_or("<unnamed>");
        panic!(
            "thread affinity violation: object belongs to thread {:?} but was accessed \
             from \"{current_name}\" ({:?}); post the operation through a ManagerHandle instead",
            self.thread_id,
            current.id()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_thread_affinity_same_thread() {
        let affinity = ThreadAffinity::current();
        assert!(affinity.is_same_thread());
        affinity.assert_same_thread();
        affinity.debug_assert_same_thread();
    }

    #[test]
    fn test_thread_affinity_different_thread() {
        let affinity = ThreadAffinity::current();
        let result = Arc::new(AtomicBool::new(false));
        let result_clone = result.clone();

        std::thread::spawn(move || {
            result_clone.store(!affinity.is_same_thread(), Ordering::SeqCst);
        })
        .join()
        .unwrap();

        assert!(result.load(Ordering::SeqCst));
    }

    #[test]
    fn test_thread_affinity_panic_on_wrong_thread() {
        let affinity = ThreadAffinity::current();
        let result = std::thread::spawn(move || {
            affinity.assert_same_thread();
        })
        .join();

        assert!(result.is_err(), "Expected thread to panic with affinity violation");
    }

    #[test]
    fn test_thread_affinity_default() {
        assert!(ThreadAffinity::default().is_same_thread());
    }
}
